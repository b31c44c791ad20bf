use chrono::Utc;

fn main() {
    // Build timestamp reported by /api/health / 构建时间，由健康检查接口返回
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=BUILD_TIME={}", stamp);

    // Re-embed the console page when it changes / 控制台页面变更时重新构建
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=assets");
}
