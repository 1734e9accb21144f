//! `mlca banks` command - recognized bank identifiers

use miette::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::render;
use crate::cli::GlobalOpts;
use crate::core::{extract_nominal, Side};

#[derive(clap::Args, Debug)]
pub struct BanksArgs {}

#[derive(Debug, Serialize, Tabled)]
struct BankInfo {
    #[tabled(rename = "Bank")]
    bank: String,
    #[tabled(rename = "Side")]
    side: Side,
    #[tabled(skip)]
    nominal: Option<i32>,
    #[serde(skip)]
    #[tabled(rename = "Nominal (mm)")]
    nominal_display: String,
}

pub fn run(_args: BanksArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.load_config()?;

    let banks: Vec<BankInfo> = config
        .parser
        .banks
        .iter()
        .map(|bank| {
            let nominal = extract_nominal(bank);
            BankInfo {
                bank: bank.clone(),
                side: Side::of_bank(bank),
                nominal,
                nominal_display: match nominal {
                    Some(n) => format!("{:+}", n),
                    None => "(no nominal)".to_string(),
                },
            }
        })
        .collect();

    if print_structured(&banks, effective_format(global.format))? {
        return Ok(());
    }

    println!("{}", render(banks));
    println!(
        "{} leaves per bank, values end at unit '{}'",
        config.parser.element_count, config.parser.unit_token
    );
    Ok(())
}
