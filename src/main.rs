use iced::{
    alignment, clipboard,
    event::{self, Event as IcedEvent},
    keyboard::{self, Key},
    time,
    widget::{
        button, checkbox, column, container, horizontal_rule, horizontal_space, opaque,
        progress_bar, row, scrollable, stack, text, text_input, Column,
    },
    window, Color, Element, Font, Length, Padding, Subscription, Task, Theme,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use research_desk::client::HttpResearchClient;
use research_desk::config::Config;
use research_desk::controller::{Completion, RequestController, SubmissionInput, SubmissionState};
use research_desk::error::ResearchError;
use research_desk::export::ReportDownload;
use research_desk::markdown::{self, Block};
use research_desk::models::{HealthStatus, ResearchResult, ServerLimits};
use research_desk::onboarding::{FileFlagStore, FlagStore, OnboardingTour, PRESENTATION_DELAY};
use research_desk::projection::{
    progress_fraction, ConfidenceTier, DetailsView, LogsView, ReferencesView, StatusSummary,
};

fn main() -> iced::Result {
    research_desk::logging::init();
    let config = Config::load();

    iced::application("Research Desk", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: iced::Size::new(config.window.width as f32, config.window.height as f32),
            min_size: Some(iced::Size::new(
                config.window.min_width as f32,
                config.window.min_height as f32,
            )),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(move || App::new(config))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Report,
    References,
    Analysis,
    Logs,
    Details,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Report, Tab::References, Tab::Analysis, Tab::Logs, Tab::Details];

    fn label(self) -> &'static str {
        match self {
            Tab::Report => "Report",
            Tab::References => "Sources",
            Tab::Analysis => "Analysis",
            Tab::Logs => "Logs",
            Tab::Details => "Details",
        }
    }
}

#[derive(Debug, Clone)]
enum ServiceStatus {
    Checking,
    Online(String),
    Offline,
}

#[derive(Debug, Clone)]
enum Message {
    QueryChanged(String),
    ApiKeyChanged(String),
    SearchKeyChanged(String),
    LiveSearchToggled(bool),
    IterationsUp,
    IterationsDown,
    Submit,
    Clear,
    ResearchFinished(Completion),
    HealthChecked(Result<HealthStatus, ResearchError>),
    LimitsLoaded(Result<ServerLimits, ResearchError>),
    TabSelected(Tab),
    CopyReport,
    DownloadReport,
    Tick,
    Escape,
    TourPresent,
    TourNext,
    TourPrevious,
    TourGoTo(usize),
    TourSkip,
    TourClose,
    ShowTourAgain,
}

struct App {
    config: Config,
    client: Arc<HttpResearchClient>,
    controller: RequestController,
    tour: OnboardingTour,
    flag_store: Arc<dyn FlagStore>,
    query: String,
    api_key: String,
    search_key: String,
    use_live_search: bool,
    max_iterations: u32,
    limits: ServerLimits,
    service_status: ServiceStatus,
    active_tab: Tab,
    loading_frame: usize,
    notice: Option<String>,
}

impl App {
    fn new(config: Config) -> (Self, Task<Message>) {
        let store: Arc<dyn FlagStore> =
            Arc::new(FileFlagStore::new(Config::get_config_dir().join("onboarding.json")));
        Self::boot(config, store, 0)
    }

    /// Builds a fresh UI state and the tasks that run once on mount.
    ///
    /// Request numbering resumes after `start_seq` so a response still in
    /// flight from before a reload is discarded.
    fn boot(
        config: Config,
        flag_store: Arc<dyn FlagStore>,
        start_seq: u64,
    ) -> (Self, Task<Message>) {
        let client = Arc::new(HttpResearchClient::with_config(&config.service));
        info!(base_url = client.base_url(), "research service configured");

        let limits = ServerLimits::default();
        let app = App {
            controller: RequestController::with_start_seq(client.clone(), start_seq),
            tour: OnboardingTour::new(flag_store.clone()),
            flag_store,
            query: String::new(),
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            search_key: std::env::var("TAVILY_API_KEY").unwrap_or_default(),
            use_live_search: false,
            max_iterations: limits.clamp_iterations(config.service.default_max_iterations),
            limits,
            service_status: ServiceStatus::Checking,
            active_tab: Tab::Report,
            loading_frame: 0,
            notice: None,
            client,
            config,
        };

        let health_client = app.client.clone();
        let health = Task::perform(
            async move { health_client.health().await },
            Message::HealthChecked,
        );
        let limits_client = app.client.clone();
        let limits = Task::perform(
            async move { limits_client.limits().await },
            Message::LimitsLoaded,
        );
        let tour = Task::perform(tokio::time::sleep(PRESENTATION_DELAY), |_| Message::TourPresent);

        (app, Task::batch([health, limits, tour]))
    }

    fn result(&self) -> Option<&ResearchResult> {
        self.controller.state().result()
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::QueryChanged(value) => {
                self.query = value;
                Task::none()
            }
            Message::ApiKeyChanged(value) => {
                self.api_key = value;
                Task::none()
            }
            Message::SearchKeyChanged(value) => {
                self.search_key = value;
                Task::none()
            }
            Message::LiveSearchToggled(enabled) => {
                self.use_live_search = enabled;
                Task::none()
            }
            Message::IterationsUp => {
                self.max_iterations = self.limits.clamp_iterations(self.max_iterations + 1);
                Task::none()
            }
            Message::IterationsDown => {
                self.max_iterations = self
                    .limits
                    .clamp_iterations(self.max_iterations.saturating_sub(1));
                Task::none()
            }
            Message::Submit => {
                let input = SubmissionInput {
                    query: self.query.clone(),
                    api_key: self.api_key.clone(),
                    max_iterations: self.max_iterations,
                    search_key: self.use_live_search.then(|| self.search_key.clone()),
                };
                self.notice = None;

                match self.controller.submit(input) {
                    Some(pending) => {
                        self.active_tab = Tab::Report;
                        self.loading_frame = 0;
                        Task::perform(pending.run(), Message::ResearchFinished)
                    }
                    None => Task::none(),
                }
            }
            Message::Clear => {
                self.query.clear();
                self.notice = None;
                self.controller.clear();
                Task::none()
            }
            Message::ResearchFinished(completion) => {
                self.controller.resolve(completion);
                Task::none()
            }
            Message::HealthChecked(result) => {
                self.service_status = match result {
                    Ok(health) => ServiceStatus::Online(health.version),
                    Err(e) => {
                        warn!("Research service health check failed: {}", e);
                        ServiceStatus::Offline
                    }
                };
                Task::none()
            }
            Message::LimitsLoaded(result) => {
                match result {
                    Ok(limits) => {
                        debug!(?limits, "service limits loaded");
                        self.max_iterations = limits.clamp_iterations(self.max_iterations);
                        self.limits = limits;
                    }
                    Err(e) => debug!("Using default iteration limits: {}", e),
                }
                Task::none()
            }
            Message::TabSelected(tab) => {
                self.active_tab = tab;
                Task::none()
            }
            Message::CopyReport => match self.result() {
                Some(result) => clipboard::write(result.report.clone()),
                None => Task::none(),
            },
            Message::DownloadReport => {
                if let Some(result) = self.result() {
                    let download = ReportDownload::today(&result.report);
                    self.notice = Some(match download.write_to(&self.config.export_dir()) {
                        Ok(path) => format!("Saved {}", path.display()),
                        Err(e) => {
                            warn!("Report download failed: {:#}", e);
                            format!("Could not save report: {:#}", e)
                        }
                    });
                }
                Task::none()
            }
            Message::Tick => {
                if self.controller.is_loading() {
                    self.loading_frame = (self.loading_frame + 1) % 80; // 10 frames * 8 messages
                }
                Task::none()
            }
            Message::Escape => {
                if self.tour.is_open() {
                    self.tour.close();
                }
                Task::none()
            }
            Message::TourPresent => {
                self.tour.present();
                Task::none()
            }
            Message::TourNext => {
                self.tour.next();
                Task::none()
            }
            Message::TourPrevious => {
                self.tour.previous();
                Task::none()
            }
            Message::TourGoTo(index) => {
                self.tour.go_to(index);
                Task::none()
            }
            Message::TourSkip => {
                self.tour.skip();
                Task::none()
            }
            Message::TourClose => {
                self.tour.close();
                Task::none()
            }
            Message::ShowTourAgain => {
                self.tour.reset();
                self.controller.clear();
                info!("onboarding reset, reloading");
                let (app, task) = Self::boot(
                    self.config.clone(),
                    self.flag_store.clone(),
                    self.controller.latest_seq(),
                );
                *self = app;
                task
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let timer = if self.controller.is_loading() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        let events = event::listen_with(|event, _status, _id| {
            if let IcedEvent::Keyboard(keyboard::Event::KeyPressed {
                key: Key::Named(keyboard::key::Named::Escape),
                ..
            }) = event
            {
                Some(Message::Escape)
            } else {
                None
            }
        });

        Subscription::batch([timer, events])
    }

    fn view(&self) -> Element<Message> {
        let main = column![self.view_search_card(), self.view_results()]
            .spacing(16)
            .width(Length::FillPortion(2));

        let sidebar = column![self.view_settings(), self.view_status()]
            .spacing(16)
            .width(Length::FillPortion(1));

        let content = container(scrollable(row![main, sidebar].spacing(16).padding(16)))
            .width(Length::Fill)
            .height(Length::Fill);

        if self.tour.is_open() {
            stack![content, self.view_tour()].into()
        } else {
            content.into()
        }
    }

    fn view_search_card(&self) -> Element<Message> {
        let loading = self.controller.is_loading();

        let input = text_input("What are the main benefits and risks of generative AI?", &self.query)
            .on_input(Message::QueryChanged)
            .on_submit(Message::Submit)
            .padding(12)
            .size(16);

        let submit_label = if loading { "Researching..." } else { "Research" };
        let buttons = row![
            button(text(submit_label))
                .on_press_maybe((!loading).then_some(Message::Submit))
                .style(button::primary)
                .padding(10),
            button(text("Clear"))
                .on_press(Message::Clear)
                .style(button::secondary)
                .padding(10),
        ]
        .spacing(10);

        let mut card = column![
            text("Ask your question").size(22),
            text("The agent searches, validates and writes a report with sources.").size(13),
            input,
            buttons,
        ]
        .spacing(10);

        if let Some(message) = self.controller.state().error_message() {
            card = card.push(
                container(column![text("Error:").size(14), text(message).size(13).style(text::danger)])
                    .padding(10)
                    .style(container::bordered_box)
                    .width(Length::Fill),
            );
        }

        container(card)
            .padding(16)
            .style(container::rounded_box)
            .width(Length::Fill)
            .into()
    }

    fn view_results(&self) -> Element<Message> {
        match self.controller.state() {
            SubmissionState::Loading => self.view_loading(),
            SubmissionState::Succeeded(result) => self.view_result_card(result),
            SubmissionState::Idle | SubmissionState::Failed(_) => column![].into(),
        }
    }

    fn view_loading(&self) -> Element<Message> {
        let loading_frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        let loading_messages = [
            "Planning the research...",
            "Generating search queries...",
            "Searching sources...",
            "Reading what came back...",
            "Validating claims...",
            "Checking for conflicts...",
            "Scoring confidence...",
            "Writing the report...",
        ];

        let message_idx = (self.loading_frame / 10) % loading_messages.len();
        let spinner_idx = self.loading_frame % loading_frames.len();

        container(
            column![
                text(loading_frames[spinner_idx]).size(32),
                text(loading_messages[message_idx]).size(15)
            ]
            .spacing(10)
            .align_x(alignment::Horizontal::Center),
        )
        .width(Length::Fill)
        .padding(40)
        .align_x(alignment::Horizontal::Center)
        .into()
    }

    fn view_result_card<'a>(&'a self, result: &'a ResearchResult) -> Element<'a, Message> {
        let header = row![
            text("Research results").size(22),
            horizontal_space(),
            button(text("[Copy]").size(14))
                .on_press(Message::CopyReport)
                .style(button::secondary)
                .padding(8),
            button(text("[Download]").size(14))
                .on_press(Message::DownloadReport)
                .style(button::secondary)
                .padding(8),
        ]
        .spacing(8)
        .align_y(alignment::Vertical::Center);

        let tabs = Tab::ALL.iter().fold(row![].spacing(6), |tabs, tab| {
            let style = if *tab == self.active_tab {
                button::primary
            } else {
                button::text
            };
            tabs.push(
                button(text(tab.label()).size(14))
                    .on_press(Message::TabSelected(*tab))
                    .style(style)
                    .padding(8),
            )
        });

        let body = match self.active_tab {
            Tab::Report => render_markdown(&result.report),
            Tab::References => view_references(ReferencesView::from_result(result)),
            Tab::Analysis => view_analysis(StatusSummary::from_result(result)),
            Tab::Logs => view_logs(LogsView::from_result(result)),
            Tab::Details => view_details(DetailsView::from_result(result)),
        };

        let mut card = column![header, tabs, horizontal_rule(1), body].spacing(12);

        if let Some(notice) = &self.notice {
            card = card.push(
                container(text(notice.as_str()).size(13))
                    .width(Length::Fill)
                    .align_x(alignment::Horizontal::Right)
                    .padding(Padding::from([4, 10])),
            );
        }

        container(card)
            .padding(16)
            .style(container::rounded_box)
            .width(Length::Fill)
            .into()
    }

    fn view_settings(&self) -> Element<Message> {
        let at_min = self.max_iterations <= self.limits.min_iterations_allowed;
        let at_max = self.max_iterations >= self.limits.max_iterations_allowed;

        let iterations = row![
            button(text("-")).on_press_maybe((!at_min).then_some(Message::IterationsDown)),
            text(self.max_iterations.to_string()).size(18),
            button(text("+")).on_press_maybe((!at_max).then_some(Message::IterationsUp)),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center);

        let mut settings = column![
            text("Settings").size(18),
            text("ANTHROPIC_API_KEY *").size(13),
            text_input("sk-ant-...", &self.api_key)
                .on_input(Message::ApiKeyChanged)
                .secure(true)
                .padding(8),
            horizontal_rule(1),
            text("Max iterations").size(13),
            iterations,
            text(format!(
                "Search and validation cycles ({}-{})",
                self.limits.min_iterations_allowed, self.limits.max_iterations_allowed
            ))
            .size(11),
            checkbox("Use live web search (Tavily)", self.use_live_search)
                .on_toggle(Message::LiveSearchToggled),
        ]
        .spacing(8);

        if self.use_live_search {
            settings = settings.push(
                text_input("tvly-...", &self.search_key)
                    .on_input(Message::SearchKeyChanged)
                    .secure(true)
                    .padding(8),
            );
        }

        let status = match &self.service_status {
            ServiceStatus::Checking => "Service: checking...".to_string(),
            ServiceStatus::Online(version) => format!("Service: online (v{})", version),
            ServiceStatus::Offline => "Service: offline".to_string(),
        };

        settings = settings
            .push(horizontal_rule(1))
            .push(text(status).size(12))
            .push(
                button(text("Show tour again").size(13))
                    .on_press(Message::ShowTourAgain)
                    .style(button::text),
            );

        container(settings)
            .padding(16)
            .style(container::rounded_box)
            .width(Length::Fill)
            .into()
    }

    fn view_status(&self) -> Element<Message> {
        let Some(result) = self.result() else {
            return column![].into();
        };
        let summary = StatusSummary::from_result(result);

        let confidence = text(format!("{}%", summary.confidence_percent)).style(match summary.tier {
            ConfidenceTier::High => text::success,
            ConfidenceTier::Medium => text::secondary,
        });
        let conflicts = text(summary.conflicts_label).size(13).style(if summary.conflicts_detected {
            text::danger
        } else {
            text::success
        });

        container(
            column![
                text("Status").size(18),
                metric_row("Confidence:", confidence.into()),
                metric_row("Sources:", text(summary.sources.to_string()).into()),
                metric_row("Validations:", text(summary.validations.to_string()).into()),
                metric_row("Iterations:", text(summary.iterations.to_string()).into()),
                horizontal_rule(1),
                conflicts,
            ]
            .spacing(8),
        )
        .padding(16)
        .style(container::rounded_box)
        .width(Length::Fill)
        .into()
    }

    fn view_tour(&self) -> Element<Message> {
        let total = self.tour.len();
        let cursor = self.tour.cursor();
        let Some(step) = self.tour.current() else {
            return column![].into();
        };

        let dots = (0..total).fold(row![].spacing(4), |dots, index| {
            let label = if index == cursor { "●" } else { "○" };
            dots.push(
                button(text(label).size(12))
                    .on_press(Message::TourGoTo(index))
                    .style(button::text)
                    .padding(2),
            )
        });

        let next_label = if self.tour.is_last_step() { "Start" } else { "Next" };
        let navigation = row![
            button(text("Previous")).on_press_maybe((cursor > 0).then_some(Message::TourPrevious)),
            horizontal_space(),
            dots,
            horizontal_space(),
            button(text(next_label))
                .on_press(Message::TourNext)
                .style(button::primary),
        ]
        .align_y(alignment::Vertical::Center);

        let mut dialog = column![
            row![
                text("Guided tour").size(22),
                horizontal_space(),
                button(text("×")).on_press(Message::TourClose).style(button::text),
            ]
            .align_y(alignment::Vertical::Center),
            text(format!("Step {} of {}", cursor + 1, total)).size(13),
            progress_bar(0.0..=1.0, progress_fraction(cursor, total)).height(6),
            text(step.title).size(20),
            text(step.description).size(15),
            navigation,
        ]
        .spacing(14)
        .max_width(560);

        if !self.tour.is_last_step() {
            dialog = dialog.push(
                container(button(text("Skip tour").size(13)).on_press(Message::TourSkip).style(button::text))
                    .width(Length::Fill)
                    .align_x(alignment::Horizontal::Center),
            );
        }

        let backdrop = container(container(dialog).padding(24).style(container::rounded_box))
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .style(|_theme: &Theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
                ..container::Style::default()
            });

        opaque(backdrop)
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

fn metric_row<'a>(label: &'a str, value: Element<'a, Message>) -> Element<'a, Message> {
    row![text(label).size(13), horizontal_space(), value]
        .align_y(alignment::Vertical::Center)
        .into()
}

fn placeholder(message: &str) -> Element<'static, Message> {
    container(text(message.to_string()).size(14))
        .width(Length::Fill)
        .padding(30)
        .align_x(alignment::Horizontal::Center)
        .into()
}

fn render_markdown(report: &str) -> Element<'static, Message> {
    let blocks = markdown::blocks(report);
    let column = blocks.into_iter().fold(Column::new().spacing(10), |col, block| {
        let element: Element<'static, Message> = match block {
            Block::Heading(level, title) => text(title).size(28 - 2 * level as u16).into(),
            Block::Paragraph(body) => text(body).size(15).into(),
            Block::ListItem { depth, text: item } => {
                let indent = "  ".repeat(depth.saturating_sub(1));
                text(format!("{}• {}", indent, item)).size(15).into()
            }
            Block::Code(code) => container(text(code).size(13))
                .padding(10)
                .style(container::bordered_box)
                .width(Length::Fill)
                .into(),
            Block::Quote(quote) => container(text(quote).size(15).style(text::secondary))
                .padding(Padding::from([0, 16]))
                .into(),
            Block::Rule => horizontal_rule(1).into(),
        };
        col.push(element)
    });
    column.into()
}

fn view_references(view: ReferencesView) -> Element<'static, Message> {
    let items = match view {
        ReferencesView::Empty(message) => return placeholder(message),
        ReferencesView::Items(items) => items,
    };

    items
        .into_iter()
        .fold(Column::new().spacing(12), |col, item| {
            let mut card = column![
                text(format!("Source {}: {}", item.index, item.title)).size(16),
                text(format!("URL: {}", item.url.as_deref().unwrap_or("-"))).size(13),
            ]
            .spacing(6);

            if let Some(relevance) = item.relevance_percent {
                card = card
                    .push(text(format!("Relevance: {}%", relevance)).size(13))
                    .push(progress_bar(0.0..=100.0, relevance as f32).height(6));
            }

            col.push(
                container(card)
                    .padding(12)
                    .style(container::bordered_box)
                    .width(Length::Fill),
            )
        })
        .into()
}

fn view_analysis(summary: StatusSummary) -> Element<'static, Message> {
    let confidence = column![
        text("Confidence level").size(16),
        text(format!("{}%", summary.confidence_percent)).size(40),
        progress_bar(0.0..=100.0, summary.confidence_percent as f32).height(10),
    ]
    .spacing(8);

    let metrics = column![
        text("Metrics").size(16),
        text(format!("Sources: {}", summary.sources)).size(14),
        text(format!("Validations: {}", summary.validations)).size(14),
        text(format!("Iterations: {}", summary.iterations)).size(14),
    ]
    .spacing(8);

    row![
        container(confidence)
            .padding(12)
            .style(container::bordered_box)
            .width(Length::FillPortion(1)),
        container(metrics)
            .padding(12)
            .style(container::bordered_box)
            .width(Length::FillPortion(1)),
    ]
    .spacing(12)
    .into()
}

fn view_logs(view: LogsView) -> Element<'static, Message> {
    match view {
        LogsView::Empty(message) => placeholder(message),
        LogsView::Messages(messages) => messages
            .into_iter()
            .fold(Column::new().spacing(4), |col, line| {
                col.push(
                    container(text(line).size(13))
                        .padding(6)
                        .style(container::bordered_box)
                        .width(Length::Fill),
                )
            })
            .into(),
    }
}

fn view_details(view: DetailsView) -> Element<'static, Message> {
    if let Some(message) = view.placeholder() {
        return placeholder(message);
    }

    let mut details = Column::new().spacing(12);

    if let Some(validations) = view.validations {
        let card = validations.into_iter().fold(
            column![text("Validations").size(16)].spacing(10),
            |card, item| {
                let mark = if item.is_validated { "✔" } else { "✘" };
                let verdict = text(format!("{} Confidence: {}%", mark, item.confidence_percent))
                    .size(13)
                    .style(if item.is_validated { text::success } else { text::danger });
                card.push(
                    column![text(item.claim).size(14), verdict, text(item.reasoning).size(13)]
                        .spacing(4),
                )
            },
        );
        details = details.push(
            container(card)
                .padding(12)
                .style(container::bordered_box)
                .width(Length::Fill),
        );
    }

    if let Some(queries) = view.search_queries {
        let card = queries.into_iter().fold(
            column![text("Generated queries").size(16)].spacing(6),
            |card, query| card.push(text(format!("• {}", query)).size(13)),
        );
        details = details.push(
            container(card)
                .padding(12)
                .style(container::bordered_box)
                .width(Length::Fill),
        );
    }

    details.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_desk::controller::Outcome;
    use research_desk::onboarding::MemoryFlagStore;

    fn boot_app(config: Config) -> App {
        let store: Arc<dyn FlagStore> = Arc::new(MemoryFlagStore::default());
        App::boot(config, store, 0).0
    }

    fn result_for(query: &str) -> ResearchResult {
        ResearchResult {
            query: query.to_string(),
            timestamp: "2025-01-01T00:00:00".to_string(),
            report: format!("# {}", query),
            confidence: 0.4,
            search_results_count: 1,
            validations_count: 0,
            iterations: 1,
            conflicts_detected: false,
            references: Vec::new(),
            full_state: None,
        }
    }

    #[tokio::test]
    async fn app_uses_the_config_it_is_given() {
        let mut config = Config::default();
        config.service.base_url = "http://research.local:9000/".into();
        config.service.default_max_iterations = 2;

        let app = boot_app(config);
        assert_eq!(app.client.base_url(), "http://research.local:9000");
        assert_eq!(app.config.service.base_url, "http://research.local:9000/");
        assert_eq!(app.max_iterations, 2);
        assert_eq!(app.controller.state(), &SubmissionState::Idle);
    }

    #[tokio::test]
    async fn show_tour_again_discards_response_from_before_reload() {
        let mut app = boot_app(Config::default());
        app.query = "old".into();
        app.api_key = "k".into();
        let _ = app.update(Message::Submit);
        assert!(app.controller.is_loading());
        let stale = Completion {
            seq: app.controller.latest_seq(),
            outcome: Outcome::Finished(Ok(result_for("old"))),
        };

        let _ = app.update(Message::ShowTourAgain);
        assert_eq!(app.controller.state(), &SubmissionState::Idle);

        app.query = "new".into();
        app.api_key = "k".into();
        let _ = app.update(Message::Submit);
        let _ = app.update(Message::ResearchFinished(stale));

        assert!(app.controller.is_loading());
        assert!(app.result().is_none());
    }
}
