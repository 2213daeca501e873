use std::io::Write;

use anyhow::Context;
use digest_core::{render_curl, ApiClient, ApiError, FileStore, StateStore};

use crate::cli::{RequestArgs, StateAction};

pub fn fetch(client: &ApiClient, args: &RequestArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let value = client.fetch(&args.endpoint, args.options()).map_err(|error| {
        let hint = match &error {
            ApiError::AuthExpired(_) => Some("token expired or invalid; set DIGEST_TOKEN or pass --token"),
            ApiError::AccessDenied(_) => Some("your account cannot access this resource"),
            _ => None,
        };
        match hint {
            Some(hint) => anyhow::Error::new(error).context(hint),
            None => anyhow::Error::new(error),
        }
    })?;
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

pub fn curl(client: &ApiClient, args: &RequestArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let request = client.build(&args.endpoint, args.options());
    writeln!(out, "{}", render_curl(&request))?;
    Ok(())
}

pub fn state(store: &FileStore, action: &StateAction, out: &mut impl Write) -> anyhow::Result<()> {
    let path = store.path().display();
    match action {
        StateAction::Get { key } => {
            if let Some(value) = store
                .get(*key)
                .with_context(|| format!("failed to read {key} from {path}"))?
            {
                writeln!(out, "{value}")?;
            }
        }
        StateAction::Set { key, value } => store
            .set(*key, value)
            .with_context(|| format!("failed to write {key} to {path}"))?,
        StateAction::Remove { key } => store
            .remove(*key)
            .with_context(|| format!("failed to remove {key} from {path}"))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use digest_core::StateKey;
    use pretty_assertions::assert_eq;

    use super::*;

    fn run_state(store: &FileStore, action: StateAction) -> String {
        let mut out = Vec::new();
        state(store, &action, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn state_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        run_state(&store, StateAction::Set { key: StateKey::WorkspaceId, value: "ws-1".into() });
        assert_eq!(run_state(&store, StateAction::Get { key: StateKey::WorkspaceId }), "ws-1\n");

        run_state(&store, StateAction::Remove { key: StateKey::WorkspaceId });
        assert_eq!(run_state(&store, StateAction::Get { key: StateKey::WorkspaceId }), "");
    }

    #[test]
    fn curl_prints_without_sending() {
        let client = ApiClient::new("http://localhost:8000/api").with_token("t");
        let args = RequestArgs {
            endpoint: "/projects".into(),
            method: digest_core::HttpMethod::Get,
            headers: Vec::new(),
            data: None,
        };
        let mut out = Vec::new();
        curl(&client, &args, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "curl 'http://localhost:8000/api/projects' -H 'Content-Type: application/json' \
             -H 'Accept: application/json' -H 'Authorization: Bearer t'\n"
        );
    }
}
