use std::{env, path::Path};

/// Build a shared object from `fixtures/fake_wlroots.c` for the loader tests.
///
/// A missing C compiler only fails those tests, not the build.
fn build_fixture(out_dir: &Path, name: &str, defines: &[&str]) {
    let compiler = match cc::Build::new().pic(true).warnings(false).try_get_compiler() {
        Ok(compiler) => compiler,
        Err(err) => {
            println!("cargo:warning=No C compiler for test fixture {}: {}", name, err);
            return;
        }
    };
    let mut cmd = compiler.to_command();
    cmd.arg("-shared")
        .arg("fixtures/fake_wlroots.c")
        .arg("-o")
        .arg(out_dir.join(name));
    for define in defines {
        cmd.arg(format!("-D{}", define));
    }

    match cmd.status() {
        Ok(status) if status.success() => {}
        Ok(status) => println!("cargo:warning=Building test fixture {} failed: {}", name, status),
        Err(err) => println!("cargo:warning=Could not run the C compiler for {}: {}", name, err),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=fixtures/fake_wlroots.c");

    let out_dir = env::var("OUT_DIR").unwrap();
    println!("cargo:rustc-env=WLR_BOOTSTRAP_FIXTURES={}", out_dir);

    build_fixture(Path::new(&out_dir), "libfake_wlroots.so.7", &[]);
    build_fixture(Path::new(&out_dir), "libfake_wlroots_counted.so", &[]);
    build_fixture(Path::new(&out_dir), "libfake_wlroots_drm.so", &["FAKE_WLR_DRM_FD"]);
}
