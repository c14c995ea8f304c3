use std::io::Write;
use std::path::PathBuf;

use clap::CommandFactory;

use crate::Cli;

fn completion_script(shell: clap_complete::Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut out = Vec::new();
    clap_complete::generate(shell, &mut cmd, "starsync", &mut out);
    out
}

fn main_man_page() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let man = clap_mangen::Man::new(Cli::command());
    let mut out = Vec::new();
    man.render(&mut out)?;
    Ok(out)
}

pub(crate) fn handle_completions(
    shell: clap_complete::Shell,
) -> Result<(), Box<dyn std::error::Error>> {
    std::io::stdout().write_all(&completion_script(shell))?;
    Ok(())
}

pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(dir) => {
            // Main page plus one per subcommand
            std::fs::create_dir_all(&dir)?;
            clap_mangen::generate_to(Cli::command(), &dir)?;
            println!("Generated man pages in: {}", dir.display());
        }
        None => {
            std::io::stdout().write_all(&main_man_page()?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn completion_script_mentions_subcommands() {
        let script = completion_script(clap_complete::Shell::Zsh);
        let script = String::from_utf8(script).expect("completion output should be UTF-8");
        assert!(script.contains("starsync"));
        assert!(script.contains("force-resummarize"));
    }

    #[test]
    fn main_man_page_contains_expected_title() {
        let page = main_man_page().expect("man rendering should succeed");
        let page = String::from_utf8(page).expect("man output should be UTF-8");
        assert!(page.to_lowercase().contains(".th starsync"));
    }

    #[test]
    fn handle_man_writes_files_when_output_directory_is_provided() {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("starsync-man-test-{nonce}"));

        handle_man(Some(dir.clone())).expect("man page generation should succeed");

        let entries = std::fs::read_dir(&dir)
            .expect("output directory should exist")
            .count();
        assert!(entries > 1, "expected a page per subcommand");

        std::fs::remove_dir_all(&dir).expect("test output directory should be removable");
    }
}
