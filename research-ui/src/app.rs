use crate::bridge::ApiClient;
use crate::browser::BrowserLocation;
use crate::config::load_config;
use crate::context::{provide_company_context, use_company};
use crate::events::{on_open_company_selector, open_company_selector};
use crate::login::Login;
use crate::selector::CompanySelector;
use crate::views::{Section, SectionPanel, Sidebar};
use company_store::LocationQuery;
use leptos::*;

const SECTION_PARAM: &str = "view";

fn initial_section() -> Section {
    match BrowserLocation.query_param(SECTION_PARAM) {
        Ok(Some(slug)) => Section::from_slug(&slug),
        _ => Section::Dashboard,
    }
}

#[component]
fn Header() -> impl IntoView {
    let company = use_company();
    let client = expect_context::<ApiClient>();
    let authenticated = expect_context::<RwSignal<bool>>();

    let sign_out = move |_| {
        client.logout();
        authenticated.set(false);
    };

    view! {
      <header class="row">
        <div>
          {move || match company.company() {
              Some(c) => view! {
                <span class="avatar">{c.initial().to_string()}</span>
                <b>{c.name.clone()}</b>
                {c.headquarters.clone().map(|h| view! { <span class="meta">{h}</span> })}
              }
              .into_view(),
              None if company.loading() => view! { <span class="meta">"Loading..."</span> }.into_view(),
              None => view! { <span class="meta">"No company selected"</span> }.into_view(),
          }}
        </div>
        <div class="row">
          <button on:click=move |_| open_company_selector()>"Change company"</button>
          <Show when=move || company.company().is_some() fallback=|| ()>
            <button on:click=move |_| company.set_company(None)>"Clear"</button>
          </Show>
          <button on:click=sign_out>"Sign out"</button>
        </div>
      </header>
    }
}

#[component]
fn Dashboard() -> impl IntoView {
    let client = expect_context::<ApiClient>();
    let config = expect_context::<company_store::DashboardConfig>();
    provide_company_context(config.selection.clone(), client);

    let active = create_rw_signal(initial_section());
    let selector_open = create_rw_signal(false);

    let listener = on_open_company_selector(move || selector_open.set(true));
    on_cleanup(move || drop(listener));

    create_effect(move |_| {
        let section = active.get();
        if let Err(err) = BrowserLocation.replace_query_param(SECTION_PARAM, Some(section.slug())) {
            tracing::debug!(error = %err, "could not record active section");
        }
    });

    view! {
      <div class="layout">
        <Sidebar active=active/>
        <div class="stack">
          <Header/>
          <SectionPanel active=active/>
        </div>
        <CompanySelector open=selector_open/>
      </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let authenticated = create_rw_signal(false);
    let client = ApiClient::new(config.api.clone()).on_unauthorized(move || authenticated.set(false));
    authenticated.set(client.token().is_some());

    provide_context(config);
    provide_context(client);
    provide_context(authenticated);

    view! {
      <Show
        when=move || authenticated.get()
        fallback=move || view! { <Login authenticated=authenticated/> }
      >
        <Dashboard/>
      </Show>
    }
}
