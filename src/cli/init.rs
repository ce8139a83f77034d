use crate::error::{Result, TreasurerError};
use crate::settings::{save_settings, settings_file_exists, settings_path, Settings};

pub fn run(force: bool) -> Result<()> {
    let path = settings_path();
    if settings_file_exists() && !force {
        return Err(TreasurerError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_settings(&Settings::default())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
