// ABOUTME: Build script for compile-time validation of enabled features
// ABOUTME: Warns when the binary is built without any chat platform

fn main() {
    let has_discord = cfg!(feature = "discord");

    if !has_discord {
        println!(
            "cargo::warning=No platform features enabled. \
             Enable at least one: discord"
        );
    }
}
