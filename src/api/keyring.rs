use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "finish-it-session";

fn attributes(server: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);
    attrs
}

/// Store the session token for `server` in the system keyring via Secret Service.
pub async fn store_token(server: &str, token: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    keyring
        .create_item(
            &format!("Finish-It session ({})", server),
            &attributes(server),
            token.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store session token: {}", e))?;

    Ok(())
}

/// Load the session token for `server`, if one was stored.
pub async fn load_token(server: &str) -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let token = String::from_utf8(secret.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }

    Ok(None)
}

/// Remove every stored session token for `server`.
pub async fn delete_token(server: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete session token: {}", e))?;
    }

    Ok(())
}
