//! `safe-connect init` command: write a default configuration file.

use std::fs;
use std::path::Path;

use safe_connect::Error;
use safe_connect::config::generate_default_config;

/// Writes the default configuration template to `output`, refusing to
/// overwrite an existing file unless `force` is set.
#[allow(clippy::print_stderr)]
pub fn run(output: &Path, force: bool) -> Result<(), Error> {
    if output.exists() && !force {
        return Err(Error::usage(format!(
            "'{}' already exists, use --force to overwrite",
            output.display()
        )));
    }

    fs::write(output, generate_default_config())?;
    eprintln!("Config file written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("safe-connect.toml");

        run(&path, false).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("registry_url"));

        fs::write(&path, "chain = \"137\"").unwrap();
        assert!(matches!(run(&path, false), Err(Error::Usage(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "chain = \"137\"");

        run(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[deployments]"));
    }
}
