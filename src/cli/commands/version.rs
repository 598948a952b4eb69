//! Version command - show version information

use anyhow::Result;

/// Print version information
///
/// With `verbose`, build details are printed as well.
pub async fn execute(verbose: bool) -> Result<()> {
    println!("{} {}", crate::NAME, crate::VERSION);

    if verbose {
        println!();
        println!("Features:");
        println!("  - Fingerprint-filtered agent sockets");
        println!("  - Multiplexing of several upstream agents");
        println!("  - JSONL event logging");
        println!();
        println!("Build info:");
        println!("  Target:    {}", env!("BUILD_TARGET"));
        println!("  Rust:      {}", env!("RUSTC_VERSION"));
        if let Ok(exe) = std::env::current_exe() {
            println!("  Executable: {}", exe.display());
        }
    }

    Ok(())
}
