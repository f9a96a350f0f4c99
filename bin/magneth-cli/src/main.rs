//! `magneth` CLI tool for multisig wallet digests, signatures and deterministic deployment.

use clap::Parser;
use magneth_cli::{Error, MainCmd};

fn main() -> Result<(), Error> {
    set_thread_panic_hook();
    MainCmd::parse().run().inspect_err(|e| println!("{e:?}"))
}

/// Sets thread panic hook, printing a backtrace and exiting with a failure status.
fn set_thread_panic_hook() {
    use std::{
        backtrace::Backtrace,
        panic::{set_hook, take_hook},
        process::exit,
    };
    let orig_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        println!("Custom backtrace: {}", Backtrace::capture());
        orig_hook(panic_info);
        exit(1);
    }));
}
