//! Print the syntax highlighting stylesheet

use anyhow::Result;

use crate::Postmill;

/// Run the css command
pub fn run(site: &Postmill) -> Result<()> {
    let css = site.assembler().renderer().stylesheet()?;
    print!("{}", css);
    Ok(())
}
