fn main() {
    // Record the interpreter the CPython backend is built against.
    #[cfg(feature = "cpython")]
    {
        let config = pyo3_build_config::get();
        println!("cargo:rustc-env=PYGLU_COMPILED_PYTHON={}", config.version);
        println!("cargo:rerun-if-env-changed=PYO3_PYTHON");
    }
}
