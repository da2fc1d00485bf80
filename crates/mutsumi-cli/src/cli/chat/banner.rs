//! Welcome banner for the chat loop.

use console::style;

use mutsumi_types::storage::StoreMedium;

/// What the banner reports about the session being opened.
pub struct BannerInfo<'a> {
    pub model: &'a str,
    pub medium: StoreMedium,
    pub session_title: Option<&'a str>,
    pub online: bool,
}

pub fn print_welcome_banner(info: &BannerInfo<'_>) {
    println!();
    println!(
        "  {} {}",
        style("🥒").green(),
        style("Mutsumi").cyan().bold()
    );
    println!("  {}", style("若叶睦 · Ave Mujica").dim());
    println!();
    println!(
        "  {}    {}",
        style("Model:").bold(),
        style(info.model).dim()
    );
    println!(
        "  {}  {}",
        style("Storage:").bold(),
        style(info.medium).dim()
    );
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(info.session_title.unwrap_or("new")).dim()
    );
    if !info.online {
        println!(
            "  {}     {}",
            style("Mode:").bold(),
            style("offline (no API key)").yellow()
        );
    }
    if info.medium != StoreMedium::Durable {
        println!(
            "  {} {}",
            style("!").yellow().bold(),
            style("History will not survive this process.").yellow()
        );
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
