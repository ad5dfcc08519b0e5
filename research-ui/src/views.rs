use crate::bridge::ApiClient;
use crate::context::use_company;
use crate::dto::{
    AnalysisDto, DashboardStatsDto, FullAnalysisDto, MetricsSummaryDto, RecentAnalysisDto,
    UpcomingTaskDto,
};
use crate::events::open_company_selector;
use leptos::*;

/// Sidebar entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Dashboard,
    Leads,
    HighLevel,
    Perception,
    Market,
    KeyIndividuals,
    Competitive,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Dashboard,
        Section::Leads,
        Section::HighLevel,
        Section::Perception,
        Section::Market,
        Section::KeyIndividuals,
        Section::Competitive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Leads => "Leads Generation",
            Section::HighLevel => "High-Level Analysis",
            Section::Perception => "Perception Analysis",
            Section::Market => "Market Analysis",
            Section::KeyIndividuals => "Key Individuals",
            Section::Competitive => "Competitive Analysis",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Leads => "leads",
            Section::HighLevel => "high-level",
            Section::Perception => "perception",
            Section::Market => "market",
            Section::KeyIndividuals => "individuals",
            Section::Competitive => "competitive",
        }
    }

    /// Analyses listed by this section; `None` for sections without a list.
    pub fn analyses(self, full: &FullAnalysisDto) -> Option<&[AnalysisDto]> {
        match self {
            Section::HighLevel => Some(&full.high_level_analyses),
            Section::Perception => Some(&full.perception_analyses),
            Section::Market => Some(&full.market_analyses),
            Section::KeyIndividuals => Some(&full.key_individuals_analyses),
            Section::Competitive => Some(&full.competitive_analyses),
            Section::Dashboard | Section::Leads => None,
        }
    }

    /// Unknown slugs land on the dashboard.
    pub fn from_slug(slug: &str) -> Section {
        Section::ALL
            .into_iter()
            .find(|v| v.slug() == slug)
            .unwrap_or(Section::Dashboard)
    }
}

#[component]
pub fn Sidebar(active: RwSignal<Section>) -> impl IntoView {
    view! {
      <nav class="sidebar">
        {Section::ALL
            .into_iter()
            .map(move |v| {
                view! {
                  <button
                    class:active=move || active.get() == v
                    on:click=move |_| active.set(v)
                  >
                    {v.label()}
                  </button>
                }
            })
            .collect_view()}
      </nav>
    }
}

#[component]
fn NoCompanyPrompt() -> impl IntoView {
    view! {
      <div class="panel empty">
        <p>"No company selected. Pick one to start the analysis."</p>
        <button on:click=move |_| open_company_selector()>"Select company"</button>
      </div>
    }
}

type AnalysisResource = Resource<Option<String>, Option<Result<FullAnalysisDto, String>>>;

/// Badge text for an analysis score.
fn score_band(score: Option<i32>) -> &'static str {
    match score {
        Some(s) if s >= 80 => "High Score",
        _ => "Moderate Score",
    }
}

fn completion_label(done: bool) -> &'static str {
    if done {
        "Completed"
    } else {
        "In Progress"
    }
}

#[component]
fn MetricsSummaryCard(analysis: AnalysisResource) -> impl IntoView {
    let render = |m: MetricsSummaryDto| {
        let leads = m
            .lead_status_breakdown
            .iter()
            .map(|(status, count)| format!("{status}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        view! {
          <ul class="metrics">
            <li>{format!("Analyses: {}", m.total_analyses)}</li>
            <li>{format!("Average score: {:.1}", m.avg_score)}</li>
            <li>
              "Average confidence: "
              <progress max="1" value=m.avg_confidence></progress>
            </li>
            <li>{format!("Total investment: {}", m.total_investment_label())}</li>
            <li class="meta">{format!("Leads by status: {leads}")}</li>
          </ul>
        }
        .into_view()
    };

    view! {
      <section class="panel">
        <h3>"Metrics summary"</h3>
        <Suspense fallback=|| view! { <div class="meta">"Loading..."</div> }>
          {move || analysis.get().flatten().map(|result| match result {
              Ok(full) => render(full.metrics_summary),
              Err(e) => view! { <pre class="error">{e}</pre> }.into_view(),
          })}
        </Suspense>
      </section>
    }
}

fn analysis_rows(items: &[AnalysisDto]) -> View {
    if items.is_empty() {
        return view! { <div class="meta">"No analyses yet for this company."</div> }.into_view();
    }
    items
        .iter()
        .map(|a| {
            let score = a.overall_score.unwrap_or(0);
            view! {
              <li class="analysis">
                <div class="row">
                  <b>{a.title.clone()}</b>
                  <span class="badge">{completion_label(a.is_completed)}</span>
                  <span class="badge secondary">{format!("Score {score}")}</span>
                  <span class="meta">{score_band(a.overall_score)}</span>
                </div>
                <p>{a.summary.clone()}</p>
                {a.confidence_score.map(|c| view! {
                  <div class="meta">"Confidence " <progress max="1" value=c></progress></div>
                })}
              </li>
            }
        })
        .collect_view()
}

#[component]
fn AnalysisList(section: Section, analysis: AnalysisResource) -> impl IntoView {
    view! {
      <section class="panel">
        <h3>"Analyses"</h3>
        <Suspense fallback=|| view! { <div class="meta">"Loading analysis..."</div> }>
          {move || analysis.get().flatten().map(|result| match result {
              Ok(full) => view! {
                <ul class="analyses">{analysis_rows(section.analyses(&full).unwrap_or_default())}</ul>
              }
              .into_view(),
              Err(e) => view! { <pre class="error">{format!("Failed to load analysis: {e}")}</pre> }
                  .into_view(),
          })}
        </Suspense>
      </section>
    }
}

/// Portfolio-wide figures; independent of the selected company.
#[component]
fn DashboardOverview() -> impl IntoView {
    let client = expect_context::<ApiClient>();
    let stats = {
        let client = client.clone();
        create_local_resource(
            || (),
            move |_| {
                let client = client.clone();
                async move { client.dashboard_stats().await.map_err(|e| e.to_string()) }
            },
        )
    };
    let recent = {
        let client = client.clone();
        create_local_resource(
            || (),
            move |_| {
                let client = client.clone();
                async move { client.recent_analyses().await.map_err(|e| e.to_string()) }
            },
        )
    };
    let tasks = create_local_resource(
        || (),
        move |_| {
            let client = client.clone();
            async move { client.upcoming_tasks().await.map_err(|e| e.to_string()) }
        },
    );

    let render_stats = |s: DashboardStatsDto| {
        view! {
          <ul class="stats">
            <li>{format!("Active prospects: {}", s.active_prospects)}</li>
            <li>{format!("Investment pipeline: {}", s.pipeline_label())}</li>
            <li>{format!("Analyses completed: {}", s.analysis_completed)}</li>
            <li>{format!("Success rate: {}%", s.success_rate)}</li>
            <li>{format!("Hot leads: {}", s.hot_leads)}</li>
          </ul>
        }
        .into_view()
    };

    let render_recent = |items: Vec<RecentAnalysisDto>| {
        items
            .into_iter()
            .map(|a| {
                let kind = a.analysis_type.as_deref().unwrap_or("analysis").replace('-', " ");
                view! {
                  <li class="analysis">
                    <div class="row">
                      <b>{a.company_name}</b>
                      <span class="badge">{kind}</span>
                      <span class="badge secondary">{completion_label(a.is_completed)}</span>
                    </div>
                    <div class="row">
                      {format!("Score: {}", a.overall_score.unwrap_or(0))}
                      <span class="meta">{score_band(a.overall_score)}</span>
                    </div>
                    <div>{a.title}</div>
                    {a.analyst_name.map(|n| view! { <div class="meta">{format!("by {n}")}</div> })}
                  </li>
                }
            })
            .collect_view()
    };

    let render_tasks = |items: Vec<UpcomingTaskDto>| {
        items
            .into_iter()
            .map(|t| {
                view! {
                  <li class="task">
                    <b>{t.task}</b>
                    <span class="badge" class:urgent={t.priority == "High"}>{t.priority.clone()}</span>
                    <div class="meta">{format!("{} · {}", t.kind.replace('_', " "), t.due_date)}</div>
                  </li>
                }
            })
            .collect_view()
    };

    let error = |e: String| view! { <pre class="error">{e}</pre> }.into_view();

    view! {
      <section class="panel">
        <h3>"Portfolio"</h3>
        <Suspense fallback=|| view! { <div class="meta">"Loading dashboard..."</div> }>
          {move || stats.get().map(|r| r.map_or_else(error, render_stats))}
        </Suspense>
      </section>
      <section class="panel">
        <h3>"Recent AI Analyses"</h3>
        <Suspense fallback=|| view! { <div class="meta">"Loading..."</div> }>
          {move || recent.get().map(|r| r.map_or_else(error, |items| view! { <ul>{render_recent(items)}</ul> }.into_view()))}
        </Suspense>
      </section>
      <section class="panel">
        <h3>"Upcoming Tasks"</h3>
        <Suspense fallback=|| view! { <div class="meta">"Loading..."</div> }>
          {move || tasks.get().map(|r| r.map_or_else(error, |items| view! { <ul>{render_tasks(items)}</ul> }.into_view()))}
        </Suspense>
      </section>
    }
}

/// Body for the active section: the "analyzing" banner for the selected
/// company plus its analysis, or a prompt to pick one.
#[component]
pub fn SectionPanel(active: RwSignal<Section>) -> impl IntoView {
    let company = use_company();
    let client = expect_context::<ApiClient>();
    // One full-analysis request per selected company, shared by every section.
    let analysis: AnalysisResource = create_local_resource(
        move || company.company_id(),
        move |id| {
            let client = client.clone();
            async move {
                let id = id?;
                Some(
                    client
                        .fetch_full_analysis(&id)
                        .await
                        .map_err(|e| e.to_string()),
                )
            }
        },
    );

    view! {
      <main class="content">
        <h2>{move || active.get().label()}</h2>
        <Show when=move || active.get() == Section::Dashboard fallback=|| ()>
          <DashboardOverview/>
        </Show>
        <Show
          when=move || !company.loading()
          fallback=|| view! { <div class="meta">"Loading selection..."</div> }
        >
          {move || match company.company() {
              None => view! { <NoCompanyPrompt/> }.into_view(),
              Some(c) => view! {
                <div class="banner">
                  {format!("Analyzing {}", c.name)}
                  {c.industry.clone().map(|i| view! { <span class="badge">{i}</span> })}
                  {c.stage.clone().map(|s| view! { <span class="badge secondary">{s}</span> })}
                </div>
                {move || match active.get() {
                    Section::Dashboard => view! { <MetricsSummaryCard analysis=analysis/> }.into_view(),
                    Section::Leads => ().into_view(),
                    section => view! { <AnalysisList section=section analysis=analysis/> }.into_view(),
                }}
              }
              .into_view(),
          }}
        </Show>
      </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_and_default_to_dashboard() {
        for v in Section::ALL {
            assert_eq!(Section::from_slug(v.slug()), v);
        }
        assert_eq!(Section::from_slug("unknown"), Section::Dashboard);
    }

    fn analysis(id: &str) -> AnalysisDto {
        AnalysisDto {
            id: id.into(),
            title: format!("analysis {id}"),
            ..AnalysisDto::default()
        }
    }

    #[test]
    fn each_analysis_section_reads_its_own_list() {
        let full = FullAnalysisDto {
            high_level_analyses: vec![analysis("h")],
            perception_analyses: vec![analysis("p")],
            market_analyses: vec![analysis("m")],
            key_individuals_analyses: vec![analysis("k")],
            competitive_analyses: vec![analysis("c")],
            ..FullAnalysisDto::default()
        };
        let ids: Vec<Option<&str>> = Section::ALL
            .iter()
            .map(|s| s.analyses(&full).map(|list| list[0].id.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![None, None, Some("h"), Some("p"), Some("m"), Some("k"), Some("c")]
        );
    }

    #[test]
    fn score_badges() {
        assert_eq!(score_band(Some(80)), "High Score");
        assert_eq!(score_band(Some(79)), "Moderate Score");
        assert_eq!(score_band(None), "Moderate Score");
        assert_eq!(completion_label(false), "In Progress");
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = Section::ALL.iter().map(|v| v.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Section::ALL.len());
    }
}
