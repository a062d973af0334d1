use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::context::CliContext;
use super::output::emit;

#[derive(Args, Clone, Debug)]
pub struct SitesArgs {
    /// Include the full selector tables
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Serialize)]
struct SiteRow {
    site: String,
    display_name: String,
    editor: String,
    url: Option<String>,
    inputs: usize,
    sends: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_selectors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_selectors: Option<Vec<String>>,
}

pub async fn cmd_sites(args: SitesArgs, ctx: &CliContext) -> Result<()> {
    let registry = ctx.config().registry()?;
    let rows: Vec<SiteRow> = registry
        .list()
        .into_iter()
        .map(|profile| SiteRow {
            site: profile.site.to_string(),
            display_name: profile.display_name.clone(),
            editor: format!("{:?}", profile.editor_kind),
            url: ctx.config().start_url(&profile.site),
            inputs: profile.input_selectors.len(),
            sends: profile.send_selectors.len(),
            input_selectors: args.verbose.then(|| profile.input_selectors.clone()),
            send_selectors: args.verbose.then(|| profile.send_selectors.clone()),
        })
        .collect();

    emit(ctx.output(), &rows, || {
        let mut out = format!(
            "{:<10} {:<12} {:<14} {:>6} {:>6}  {}\n",
            "ID", "NAME", "EDITOR", "INPUTS", "SENDS", "URL"
        );
        for row in &rows {
            out.push_str(&format!(
                "{:<10} {:<12} {:<14} {:>6} {:>6}  {}\n",
                row.site,
                row.display_name,
                row.editor,
                row.inputs,
                row.sends,
                row.url.as_deref().unwrap_or("-")
            ));
            if let (Some(inputs), Some(sends)) = (&row.input_selectors, &row.send_selectors) {
                for selector in inputs {
                    out.push_str(&format!("    input  {selector}\n"));
                }
                for selector in sends {
                    out.push_str(&format!("    send   {selector}\n"));
                }
            }
        }
        out
    })
}
