use anyhow::Result;

use pling_server::auth::{AdminPolicy, Verifier};
use pling_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let verifier = match (std::env::var("AUTH_URL"), std::env::var("AUTH_ANON_KEY")) {
        (Ok(url), Ok(key)) => Verifier::http(url, key),
        _ => {
            eprintln!("AUTH_URL or AUTH_ANON_KEY not set; notification posting will be rejected");
            Verifier::fixed([])
        }
    };

    let admins = match std::env::var("ADMIN_USERS") {
        Ok(list) => AdminPolicy::from_list(&list),
        Err(_) => AdminPolicy::allow_all(),
    };

    let protect_history = std::env::var("PROTECT_HISTORY")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let state = AppState::new(verifier, admins, protect_history);
    let app = pling_server::router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    println!("pling server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
