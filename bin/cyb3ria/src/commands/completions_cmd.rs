use clap_complete::{generate, Shell};

/// Generate shell completion scripts for `cmd`.
pub async fn run(shell: &str, mut cmd: clap::Command) -> anyhow::Result<()> {
    let shell = match shell.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" | "ps" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Options: bash, zsh, fish, powershell, elvish",
                shell
            );
        }
    };

    generate(shell, &mut cmd, "cyb3ria", &mut std::io::stdout());

    eprintln!();
    eprintln!("# Usage:");
    match shell {
        Shell::Bash => {
            eprintln!("#   cyb3ria completions bash > ~/.local/share/bash-completion/completions/cyb3ria");
            eprintln!("#   or: eval \"$(cyb3ria completions bash)\"");
        }
        Shell::Zsh => {
            eprintln!("#   cyb3ria completions zsh > ~/.zfunc/_cyb3ria");
        }
        Shell::Fish => {
            eprintln!("#   cyb3ria completions fish > ~/.config/fish/completions/cyb3ria.fish");
        }
        _ => {}
    }

    Ok(())
}
