use crate::bridge::ApiClient;
use crate::context::use_company;
use crate::dto::CompanyDto;
use company_store::CompanySummary;
use gloo::timers::callback::Timeout;
use leptos::*;
use wasm_bindgen_futures::spawn_local;

/// Case-insensitive match on name or description. An empty query keeps everything.
pub fn filter_companies(companies: Vec<CompanyDto>, query: &str) -> Vec<CompanyDto> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return companies;
    }
    companies
        .into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Search endpoint first; on failure list everything and filter locally.
async fn find_companies(client: &ApiClient, query: &str) -> Vec<CompanyDto> {
    match client.search_companies(query).await {
        Ok(found) => found,
        Err(err) => {
            tracing::debug!(error = %err, "search endpoint failed, filtering full list");
            match client.list_companies().await {
                Ok(all) => filter_companies(all, query),
                Err(err) => {
                    tracing::warn!(error = %err, "company search failed");
                    Vec::new()
                }
            }
        }
    }
}

#[component]
pub fn CompanySelector(open: RwSignal<bool>) -> impl IntoView {
    let company = use_company();
    let client = expect_context::<ApiClient>();
    let debounce_ms = client.config().search_debounce_ms;

    let query = create_rw_signal(String::new());
    let results = create_rw_signal(Vec::<CompanyDto>::new());
    let loading = create_rw_signal(false);
    let pending = store_value(None::<Timeout>);
    let latest = store_value(0u64);

    let search = move |q: String| {
        let client = client.clone();
        let seq = latest.get_value() + 1;
        latest.set_value(seq);
        loading.set(true);
        spawn_local(async move {
            let found = find_companies(&client, &q).await;
            // A newer search has been issued; its results win.
            if latest.try_get_value() == Some(seq) {
                results.try_set(found);
                loading.try_set(false);
            }
        });
    };

    create_effect(move |was_open: Option<bool>| {
        let is_open = open.get();
        if is_open && was_open != Some(true) {
            query.set(String::new());
        }
        is_open
    });

    create_effect(move |_| {
        let q = query.get();
        if !open.get() {
            pending.set_value(None);
            return;
        }
        let search = search.clone();
        pending.set_value(Some(Timeout::new(debounce_ms, move || search(q))));
    });

    let choose = move |dto: CompanyDto| {
        company.set_company(Some(CompanySummary::from(dto)));
        open.set(false);
    };

    view! {
      <Show when=move || open.get() fallback=|| ()>
        <div class="overlay" on:click=move |_| open.set(false)></div>
        <div class="dialog">
          <h2>"Select a company"</h2>
          <input
            autofocus=true
            placeholder="Search companies..."
            prop:value=move || query.get()
            on:input=move |ev| query.set(event_target_value(&ev))
          />
          <div class="results">
            <Show when=move || loading.get() fallback=|| ()>
              <div class="meta">"Loading companies..."</div>
            </Show>
            <Show when=move || !loading.get() && results.with(Vec::is_empty) fallback=|| ()>
              <div class="meta">"No companies found"</div>
            </Show>
            <Show when=move || !loading.get() fallback=|| ()>
              <For
                each=move || results.get()
                key=|c| c.id.clone()
                children=move |c| {
                  let initial = c.name.chars().next().unwrap_or('?');
                  let industry = c.industry.clone();
                  let stage = c.stage.clone();
                  let headquarters = c.headquarters.clone();
                  let founded = c.founded_year;
                  let name = c.name.clone();
                  view! {
                    <button class="company-row" on:click=move |_| choose(c.clone())>
                      <span class="avatar">{initial.to_string()}</span>
                      <div>
                        <b>{name}</b>
                        {industry.map(|i| view! { <span class="badge">{i}</span> })}
                        {stage.map(|s| view! { <span class="badge secondary">{s}</span> })}
                        <div class="meta">
                          {headquarters.map(|h| view! { <span>{h}</span> })}
                          {founded.map(|y| view! { <span>{format!(" est. {y}")}</span> })}
                        </div>
                      </div>
                    </button>
                  }
                }
              />
            </Show>
          </div>
        </div>
      </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn company(id: &str, name: &str, description: Option<&str>) -> CompanyDto {
        CompanyDto {
            id: id.into(),
            name: name.into(),
            description: description.map(Into::into),
            ..CompanyDto::default()
        }
    }

    fn ids(companies: &[CompanyDto]) -> Vec<&str> {
        companies.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn filter_matches_name_or_description_ignoring_case() {
        let all = vec![
            company("1", "Acme Robotics", None),
            company("2", "Globex", Some("Industrial ROBOTICS platform")),
            company("3", "Initech", Some("Enterprise software")),
        ];
        assert_eq!(ids(&filter_companies(all, "robotics")), vec!["1", "2"]);
    }

    #[test]
    fn blank_query_keeps_everything() {
        let all = vec![company("1", "Acme", None), company("2", "Globex", None)];
        assert_eq!(ids(&filter_companies(all, "   ")), vec!["1", "2"]);
    }
}
