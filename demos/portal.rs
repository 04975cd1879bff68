//! # Portal Demo
//!
//! Opens the portal in a window.
//!
//! - **Click / Enter / Space**: step through the portal
//! - **Escape / Backspace**: come back
//! - **M**: toggle the ambient track
//!
//! Optional arguments: an asset directory holding `metal.png`, `noise.png`
//! and `smoke.png`, then a JSON config file. Missing textures are replaced
//! by generated ones. Without a config file the defaults follow the window
//! size.
//!
//! Run with: `cargo run --example portal -- assets portal.json`

use void_portal::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let asset_dir = args.next();
    let app = match args.next() {
        Some(path) => PortalApp::new(PortalConfig::from_file(path)?),
        None => PortalApp::responsive(),
    };

    let mut app = app.with_character(CharacterAsset::new("figure"));
    if let Some(dir) = asset_dir {
        app = app.with_asset_dir(dir);
    }
    app.run()?;
    Ok(())
}
