use std::io::Write;
use std::{env, fs};

fn main() {
    let outdir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");

    let outfile = format!("{outdir}/compiled_at.txt");
    let mut fh = fs::File::create(outfile).expect("Failed to create compiled_at.txt");
    write!(fh, r#""{}""#, chrono::Local::now()).ok();

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".into());
    let outfile = format!("{outdir}/target.txt");
    let mut fh = fs::File::create(outfile).expect("Failed to create target.txt");
    write!(fh, r#""{target}""#).ok();
}
