use super::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use hcledit_editor::{AttributeGet, Filter};

#[derive(Args, Debug)]
pub struct AttributeArgs {
    #[command(subcommand)]
    pub command: AttributeCommand,
}

#[derive(Subcommand, Debug)]
pub enum AttributeCommand {
    /// Print the value of an attribute
    Get {
        /// Attribute address, e.g. `b1.l1.a1`
        address: String,
    },

    /// Replace the value of an attribute
    Set {
        /// Attribute address, e.g. `b1.l1.a1`
        address: String,

        /// New value expression, e.g. `"v2"` or `var.name`
        value: String,
    },

    /// Remove an attribute
    Rm {
        /// Attribute address, e.g. `b1.l1.a1`
        address: String,
    },
}

pub fn attribute(args: AttributeArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AttributeCommand::Get { address } => ctx.derive(AttributeGet::new(&address)?),
        AttributeCommand::Set { address, value } => {
            ctx.edit(Filter::attribute_set(&address, &value)?)
        }
        AttributeCommand::Rm { address } => {
            let filter = Filter::attribute_remove(&address)?;
            if ctx.tidy {
                ctx.edit(filter.then_vertical_format())
            } else {
                ctx.edit(filter)
            }
        }
    }
}
