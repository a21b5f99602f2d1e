use super::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use hcledit_editor::{BlockGet, BlockList, Filter};

#[derive(Args, Debug)]
pub struct BlockArgs {
    #[command(subcommand)]
    pub command: BlockCommand,
}

#[derive(Subcommand, Debug)]
pub enum BlockCommand {
    /// Print matching blocks
    Get {
        /// Block address; a trailing `*` matches any further labels
        address: String,
    },

    /// List the address of every block
    List {
        /// Print a JSON array instead of one address per line
        #[arg(long)]
        json: bool,
    },

    /// Remove matching blocks
    Rm {
        /// Block address; a trailing `*` matches any further labels
        address: String,
    },
}

pub fn block(args: BlockArgs, ctx: &Context) -> Result<()> {
    match args.command {
        BlockCommand::Get { address } => ctx.derive(BlockGet::new(&address)?),
        BlockCommand::List { json: false } => ctx.derive(BlockList::new()),
        BlockCommand::List { json: true } => ctx.derive(BlockList::json()),
        BlockCommand::Rm { address } => {
            let filter = Filter::block_remove(&address)?;
            if ctx.tidy {
                ctx.edit(filter.then_vertical_format())
            } else {
                ctx.edit(filter)
            }
        }
    }
}
