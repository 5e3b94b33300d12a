use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docpickd",
    about = "Document picker and content-URI path resolver"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the host daemon the application shell connects to
    Serve {
        /// Root directory backing the filesystem content provider
        #[arg(long)]
        content_root: Option<PathBuf>,
    },

    /// Open the native picker locally and print the resolved path
    Pick {
        /// Allowed file extension (repeatable)
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Allowed MIME type (repeatable; a single one becomes the hard filter)
        #[arg(long = "mime")]
        mime_types: Vec<String>,

        /// Symbol replaced by `_` in the resulting file name (repeatable)
        #[arg(long = "invalid-symbol")]
        invalid_symbols: Vec<String>,

        /// Root directory backing the filesystem content provider
        #[arg(long)]
        content_root: Option<PathBuf>,
    },

    /// Resolve a content URI to a local path and print it
    Resolve {
        /// The handle to resolve, e.g. file:///a/b.txt or content://...
        uri: String,

        /// Root directory backing the filesystem content provider
        #[arg(long)]
        content_root: Option<PathBuf>,
    },

    /// Talk to a running host daemon
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
}

#[derive(Subcommand)]
pub enum ClientAction {
    /// Request a pick from the daemon
    Pick {
        #[arg(long = "ext")]
        extensions: Vec<String>,

        #[arg(long = "mime")]
        mime_types: Vec<String>,

        #[arg(long = "invalid-symbol")]
        invalid_symbols: Vec<String>,
    },

    /// Ask the daemon to resolve a content URI
    Resolve { uri: String },
}

/// Clap collects repeated flags into a possibly-empty `Vec`; the option
/// types treat an empty list as "unconstrained", spelled `None`.
pub fn none_if_empty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() { None } else { Some(list) }
}
