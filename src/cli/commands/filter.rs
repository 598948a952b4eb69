//! Filter command - serve one socket restricted to matching keys

use anyhow::{Context, Result};

use super::serve::{SocketPlan, serve};
use crate::agent::UpstreamSpec;
use crate::cli::args::FilterArgs;
use crate::error::Error;
use crate::filter::FingerprintSet;

/// Build the socket plan for the filter command
pub fn plan(args: &FilterArgs) -> Result<SocketPlan> {
    let upstream = args.upstream.clone().ok_or_else(|| {
        Error::Config(
            "Upstream socket path is required. Set SSH_AUTH_SOCK or use --upstream".to_string(),
        )
    })?;
    let fingerprints =
        FingerprintSet::parse(&args.fingerprints).context("Invalid --fingerprints")?;

    Ok(SocketPlan {
        name: "filter".to_string(),
        path: args.listen.clone(),
        upstreams: vec![UpstreamSpec::new(upstream).with_fingerprints(fingerprints)],
    })
}

/// Execute the filter command
pub async fn execute(args: FilterArgs) -> Result<()> {
    let plan = plan(&args)?;
    serve(vec![plan], args.log).await
}
