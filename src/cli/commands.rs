use clap::Subcommand;

use super::authorize::AuthorizeArgs;
use super::keys::KeysArgs;
use super::serve::ServeArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Authorize a single token-authorizer event and print the response
    Authorize(AuthorizeArgs),

    /// Serve the authorizer over HTTP
    Serve(ServeArgs),

    /// Fetch the published key set and list usable keys
    Keys(KeysArgs),
}
