use super::Context;
use anyhow::Result;
use hcledit_editor::Filter;

/// Format the whole document.
pub fn fmt(ctx: &Context) -> Result<()> {
    ctx.edit(Filter::Format)
}
