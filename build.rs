use std::env;

fn main() {
    // 获取目标平台信息
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TARGET");

    // 写入 `--version` 的长输出
    println!("cargo:rustc-env=AUTOBACK_TARGET={}", target);
}
