extern crate clap;
use clap::*;
use env_logger::Env;

mod cmd_balign;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let app = Command::new("balign")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`balign` - Plan blasr alignment runs")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_balign::plan::make_subcommand())
        .after_help(
            r###"Subcommands:

* plan - Reconcile typed options with raw blasr flags and print the
         command line for the run. The command is never executed here;
         hand it to your scheduler or shell.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("plan", sub_matches)) => cmd_balign::plan::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
