use log::info;

use crate::shop::location::LocationKey;
use crate::shop::signs::ShopSign;

/// Host-side world mutations a sign build can trigger.
pub trait World: Send + Sync {
    /// Break the block at `location`, dropping it as an item when `drop_contents` is set.
    fn destroy(&self, location: &LocationKey, drop_contents: bool) -> anyhow::Result<()>;

    /// Write a committed shop onto its sign.
    fn place_shop(&self, sign: &ShopSign) -> anyhow::Result<()>;
}

/// World that records nothing and only logs; used by the CLI and for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWorld;

impl World for LogWorld {
    fn destroy(&self, location: &LocationKey, drop_contents: bool) -> anyhow::Result<()> {
        info!("destroy sign at {} (drop: {})", location, drop_contents);
        Ok(())
    }

    fn place_shop(&self, sign: &ShopSign) -> anyhow::Result<()> {
        info!("{} shop placed at {}", sign.sign_type, sign.location);
        Ok(())
    }
}
