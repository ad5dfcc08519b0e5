use crate::bridge::{ApiClient, ApiError};
use leptos::*;
use wasm_bindgen_futures::spawn_local;

fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { status: 400, .. } | ApiError::Unauthorized => {
            "Invalid username or password".to_string()
        }
        other => format!("Login failed: {other}"),
    }
}

/// Token hand-off form. On success the token is persisted by the client and
/// `authenticated` flips to true.
#[component]
pub fn Login(authenticated: RwSignal<bool>) -> impl IntoView {
    let client = expect_context::<ApiClient>();
    let username = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let submitting = create_rw_signal(false);
    let error = create_rw_signal(None::<String>);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let user = username.get_untracked().trim().to_string();
        let pass = password.get_untracked();
        if user.is_empty() || pass.is_empty() {
            error.set(Some("Username and password are required".into()));
            return;
        }
        submitting.set(true);
        let client = client.clone();
        spawn_local(async move {
            match client.login(&user, &pass).await {
                Ok(_) => {
                    error.set(None);
                    authenticated.set(true);
                }
                Err(err) => error.set(Some(login_error_message(&err))),
            }
            submitting.set(false);
        });
    };

    view! {
      <form class="panel login" on:submit=submit>
        <h2>"Sign in"</h2>
        <input
          placeholder="Username"
          prop:value=move || username.get()
          on:input=move |ev| username.set(event_target_value(&ev))
        />
        <input
          type="password"
          placeholder="Password"
          prop:value=move || password.get()
          on:input=move |ev| password.set(event_target_value(&ev))
        />
        <button type="submit" disabled=move || submitting.get()>"Sign in"</button>
        <Show when=move || error.get().is_some() fallback=|| ()>
          <pre class="error">{move || error.get().unwrap_or_default()}</pre>
        </Show>
      </form>
    }
}
