use anyhow::{bail, Context, Result};

/// Command-line switches of the studio driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudioOptions {
    /// Submit batches to an offscreen wgpu target.
    pub gpu: bool,
    /// Start with hidden brushes revealed.
    pub show_hidden: bool,
    /// Draw occluded edges in a separate pass.
    pub occluded: bool,
    /// `env_logger` filter; overrides `RUST_LOG`.
    pub log: Option<String>,
}

pub const USAGE: &str = "usage: brushwork-studio [--gpu] [--show-hidden] [--occluded] [--log <filter>]";

impl StudioOptions {
    /// Parses arguments without the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = StudioOptions::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--gpu" => options.gpu = true,
                "--show-hidden" => options.show_hidden = true,
                "--occluded" => options.occluded = true,
                "--log" => {
                    let filter = args.next().context("--log expects a filter argument")?;
                    options.log = Some(filter);
                }
                other => bail!("unknown argument `{other}`\n{USAGE}"),
            }
        }

        Ok(options)
    }
}
