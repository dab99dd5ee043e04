use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const TEMPLATE_DIR: &str = "templates";

/// Collects `(name, path)` pairs for every template below `dir`.
///
/// Names are `/` separated and relative to the template folder.  Hidden
/// files and folders are left out since the loader would refuse them.
fn collect(dir: &Path, prefix: &str, out: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        let name = format!("{prefix}{file_name}");
        if entry.file_type()?.is_dir() {
            collect(&entry.path(), &format!("{name}/"), out)?;
        } else {
            out.push((name, entry.path()));
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={TEMPLATE_DIR}");

    let mut templates = Vec::new();
    if Path::new(TEMPLATE_DIR).is_dir() {
        collect(Path::new(TEMPLATE_DIR), "", &mut templates)?;
    }
    templates.sort();

    let mut table = String::from("&[\n");
    for (name, path) in templates {
        let source = fs::read_to_string(&path)?;
        table.push_str(&format!("    ({name:?}, {source:?}),\n"));
    }
    table.push_str("]\n");

    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").unwrap());
    fs::write(out_dir.join("bundled_templates.rs"), table)
}
