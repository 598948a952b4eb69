//! Mux command - serve one socket combining several agents

use anyhow::Result;

use super::serve::{SocketPlan, serve};
use crate::agent::UpstreamSpec;
use crate::cli::args::MuxArgs;

/// Build the socket plan for the mux command
pub fn plan(args: &MuxArgs) -> SocketPlan {
    SocketPlan {
        name: "mux".to_string(),
        path: args.listen.clone(),
        upstreams: args.upstreams.iter().map(UpstreamSpec::new).collect(),
    }
}

/// Execute the mux command
pub async fn execute(args: MuxArgs) -> Result<()> {
    let plan = plan(&args);
    serve(vec![plan], args.log).await
}
