//! Dashboard navigation: an explicit state value and the one function that
//! moves it forward.

use crate::config::Config;
use crate::logging::log_transition;
use crate::selection::parse_column_list;
use crate::views::{self, ViewParams, ViewReport};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Overview,
    BehaviorNews,
    EntityAnalysis,
    RelationAnalysis,
}

impl Page {
    /// Pages reachable from the home menu, in menu order.
    pub const MENU: [Page; 4] = [
        Page::Overview,
        Page::BehaviorNews,
        Page::EntityAnalysis,
        Page::RelationAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Overview => "overview",
            Page::BehaviorNews => "behavior_news",
            Page::EntityAnalysis => "entity_analysis",
            Page::RelationAnalysis => "relation_analysis",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "MIND Dataset Analysis",
            Page::Overview => "MIND Dataset Overview",
            Page::BehaviorNews => "Behavior-News Analysis",
            Page::EntityAnalysis => "Entity Embeddings Analysis",
            Page::RelationAnalysis => "Relation Embeddings Analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open(Page),
    Back,
    SetDimensions(String),
    SetBoxplotColumns(Vec<String>),
    SetRelationColumn(String),
}

impl Action {
    fn label(&self) -> String {
        match self {
            Action::Open(p) => format!("open:{}", p.as_str()),
            Action::Back => "back".to_string(),
            Action::SetDimensions(_) => "set_dimensions".to_string(),
            Action::SetBoxplotColumns(_) => "set_boxplot_columns".to_string(),
            Action::SetRelationColumn(_) => "set_relation_column".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub page: Page,
    pub params: ViewParams,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            page: Page::Home,
            params: ViewParams::default(),
        }
    }
}

/// Apply one action. Parameter actions only touch `params`.
pub fn dispatch(state: DashboardState, action: Action) -> DashboardState {
    let from = state.page;
    let label = action.label();
    let DashboardState { mut page, mut params } = state;
    match action {
        Action::Open(p) => page = p,
        Action::Back => page = Page::Home,
        Action::SetDimensions(text) => params.dimensions = text,
        Action::SetBoxplotColumns(cols) => params.boxplot_columns = Some(cols),
        Action::SetRelationColumn(name) => params.relation_column = Some(name),
    }
    log_transition(from.as_str(), page.as_str(), &label);
    DashboardState { page, params }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Menu { title: String, entries: Vec<(usize, String)> },
    View(ViewReport),
}

pub fn render(state: &DashboardState, cfg: &Config) -> Screen {
    match state.page {
        Page::Home => Screen::Menu {
            title: Page::Home.title().to_string(),
            entries: Page::MENU
                .iter()
                .enumerate()
                .map(|(i, p)| (i + 1, p.title().to_string()))
                .collect(),
        },
        Page::Overview => Screen::View(views::overview::render(cfg)),
        Page::BehaviorNews => Screen::View(views::behavior_news::render(cfg)),
        Page::EntityAnalysis => Screen::View(views::entity::render(cfg, &state.params)),
        Page::RelationAnalysis => Screen::View(views::relation::render(cfg, &state.params)),
    }
}

/// Turn one line of dashboard input into an action.
///
/// `1`..`4` open a page, `back` returns home, `dims 1,2,3` sets the
/// histogram dimensions, `box Dim_1,Dim_2` the boxplot columns (`box` alone
/// clears them) and `rel Dim_5` the relation boxplot column.
pub fn parse_command(line: &str) -> Option<Action> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };
    match cmd.to_ascii_lowercase().as_str() {
        "back" | "home" | "b" => Some(Action::Back),
        "dims" => Some(Action::SetDimensions(rest.to_string())),
        "box" => Some(Action::SetBoxplotColumns(parse_column_list(rest))),
        "rel" if !rest.is_empty() => Some(Action::SetRelationColumn(rest.to_string())),
        n => n
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| Page::MENU.get(i).copied())
            .map(Action::Open),
    }
}
