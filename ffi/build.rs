use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("MANTLE_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("mantle.h"));
        }
        Err(e) => println!("cargo:warning=could not generate mantle.h: {e}"),
    }

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
}
