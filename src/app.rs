use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::api::{AnamneseBackend, ApiError, ExportFormat};
use crate::auth::{AuthContext, AuthRelay};
use crate::config::Config;
use crate::session::DraftStore;
use crate::ui::dashboard::{Dashboard, DashboardAction};
use crate::ui::detail::{DetailAction, DetailView};
use crate::ui::login::{LoginAction, LoginScreen};
use crate::ui::terminal_guard::TerminalGuard;
use crate::ui::toast::Toaster;
use crate::ui::wizard::{WizardAction, WizardScreen};
use crate::wizard::{SaveError, Wizard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Wizard,
    Detail(String),
}

/// Backend work requested by a key press, run after the next frame is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Login(String),
    Logout,
    Fetch(Option<String>),
    Delete(String),
    Save,
    LoadDetail(String),
    Export(String, ExportFormat),
    Summary(String),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Login(_) => "login",
            Command::Logout => "logout",
            Command::Fetch(_) => "fetch",
            Command::Delete(_) => "delete",
            Command::Save => "save",
            Command::LoadDetail(_) => "load_detail",
            Command::Export(..) => "export",
            Command::Summary(_) => "summary",
        }
    }
}

pub struct App {
    config: Config,
    backend: Box<dyn AnamneseBackend>,
    auth: AuthRelay,
    context: AuthContext,
    route: Route,
    login: LoginScreen,
    dashboard: Dashboard,
    wizard: Option<WizardScreen>,
    detail: Option<DetailView>,
    toaster: Toaster,
    pending: Option<Command>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, backend: Box<dyn AnamneseBackend>) -> Result<Self> {
        let auth = AuthRelay::new(&config);
        let login = LoginScreen::new(auth.login_url()?);
        let toaster = Toaster::new(Duration::from_secs(config.ui.toast_secs));

        Ok(Self {
            config,
            backend,
            auth,
            context: AuthContext::pending(),
            route: Route::Login,
            login,
            dashboard: Dashboard::new(),
            wizard: None,
            detail: None,
            toaster,
            pending: None,
            should_quit: false,
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    /// Resolve the user, then pick the first screen
    pub async fn start(&mut self, location: Option<&str>) {
        self.context = self.auth.bootstrap(self.backend.as_mut(), location).await;
        if self.context.is_authenticated() {
            self.open_dashboard();
        } else {
            self.route = Route::Login;
        }
    }

    pub async fn run(&mut self, location: Option<&str>) -> Result<()> {
        self.start(location).await;

        let mut guard = TerminalGuard::enter()?;
        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            guard.terminal().draw(|f| self.draw(f))?;

            // Run requested work after the frame showing its pending state
            if let Some(command) = self.pending.take() {
                self.execute(command).await;
                continue;
            }

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, Instant::now());
                    }
                }
            }

            self.tick(Instant::now());
        }

        if let Some(screen) = self.wizard.as_mut() {
            screen.wizard_mut().flush();
        }
        Ok(())
    }

    /// Periodic work: the draft autosave
    pub fn tick(&mut self, now: Instant) {
        if let Some(screen) = self.wizard.as_mut() {
            screen.wizard_mut().tick(now);
        }
    }

    fn open_dashboard(&mut self) {
        self.route = Route::Dashboard;
        self.dashboard.set_loading(true);
        self.pending = Some(Command::Fetch(self.dashboard.search_term()));
    }

    fn open_wizard(&mut self) {
        let wizard = Wizard::open(
            DraftStore::new(&self.config.state_path()),
            Duration::from_millis(self.config.wizard.autosave_debounce_ms),
        );
        if wizard.was_restored() {
            self.toaster.info("Rascunho restaurado");
        }
        self.wizard = Some(WizardScreen::new(wizard));
        self.route = Route::Wizard;
    }

    fn close_wizard(&mut self) {
        if let Some(mut screen) = self.wizard.take() {
            screen.wizard_mut().flush();
        }
    }

    fn open_detail(&mut self, id: String) {
        self.detail = Some(DetailView::new(id.clone()));
        self.route = Route::Detail(id.clone());
        self.pending = Some(Command::LoadDetail(id));
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.pending.is_some() {
            return;
        }

        match self.route.clone() {
            Route::Login => match self.login.handle_key(key) {
                LoginAction::Quit => self.should_quit = true,
                LoginAction::Submit(location) => self.pending = Some(Command::Login(location)),
                LoginAction::None => {}
            },
            Route::Dashboard => match self.dashboard.handle_key(key) {
                DashboardAction::Quit => self.should_quit = true,
                DashboardAction::NewRecord => self.open_wizard(),
                DashboardAction::Open(id) => self.open_detail(id),
                DashboardAction::Search(term) => {
                    self.dashboard.set_loading(true);
                    self.pending = Some(Command::Fetch(term));
                }
                DashboardAction::Delete(id) => self.pending = Some(Command::Delete(id)),
                DashboardAction::Logout => self.pending = Some(Command::Logout),
                DashboardAction::None => {}
            },
            Route::Wizard => {
                let Some(screen) = self.wizard.as_mut() else {
                    self.open_dashboard();
                    return;
                };
                match screen.handle_key(key, now) {
                    WizardAction::Exit => {
                        self.close_wizard();
                        self.open_dashboard();
                    }
                    WizardAction::Save => self.pending = Some(Command::Save),
                    WizardAction::None => {}
                }
            }
            Route::Detail(id) => {
                let Some(view) = self.detail.as_mut() else {
                    self.open_dashboard();
                    return;
                };
                match view.handle_key(key) {
                    DetailAction::Back => {
                        self.detail = None;
                        self.open_dashboard();
                    }
                    DetailAction::Export(format) => {
                        self.pending = Some(Command::Export(id, format));
                    }
                    DetailAction::GenerateSummary => {
                        if view.begin_summary() {
                            self.pending = Some(Command::Summary(id));
                        }
                    }
                    DetailAction::None => {}
                }
            }
        }
    }

    /// Await one backend call and apply its outcome
    async fn execute(&mut self, command: Command) {
        debug!(command = command.name(), "Running command");
        match command {
            Command::Login(location) => {
                self.context = self
                    .auth
                    .bootstrap(self.backend.as_mut(), Some(&location))
                    .await;
                if self.context.is_authenticated() {
                    self.open_dashboard();
                } else {
                    self.login
                        .set_error("Não foi possível entrar. Tente fazer login novamente.");
                }
            }
            Command::Logout => {
                self.auth
                    .logout(self.backend.as_mut(), &mut self.context)
                    .await;
                self.dashboard = Dashboard::new();
                self.route = Route::Login;
            }
            Command::Fetch(term) => {
                match self.backend.list_anamneses(term.as_deref()).await {
                    Ok(records) => self.dashboard.set_records(records),
                    Err(e) => {
                        self.dashboard.set_loading(false);
                        self.report(&e, "Erro ao carregar anamneses");
                    }
                }
            }
            Command::Delete(id) => match self.backend.delete_anamnese(&id).await {
                Ok(()) => {
                    info!(id = %id, "Anamnese deleted");
                    self.toaster.success("Anamnese excluída");
                    self.open_dashboard();
                }
                Err(e) => self.report(&e, "Erro ao excluir anamnese"),
            },
            Command::Save => {
                let Some(screen) = self.wizard.as_mut() else {
                    return;
                };
                match screen.wizard_mut().save(self.backend.as_ref()).await {
                    Ok(saved) => {
                        self.wizard = None;
                        self.toaster.success("Anamnese salva com sucesso!");
                        self.open_detail(saved.id);
                    }
                    Err(SaveError::Api(e)) => self.report(&e, "Erro ao salvar anamnese"),
                    Err(e) => debug!("Save ignored: {}", e),
                }
            }
            Command::LoadDetail(id) => {
                let result = self.backend.get_anamnese(&id).await;
                if let Err(e) = &result {
                    self.report(e, "Erro ao carregar anamnese");
                }
                if let Some(view) = self.detail.as_mut() {
                    view.set_loaded(result);
                }
            }
            Command::Export(id, format) => {
                let result = self.backend.download_export(&id, format).await;
                match result {
                    Ok(file) => match file.save_to(&self.config.exports_path()) {
                        Ok(path) => {
                            info!(path = %path.display(), "Export saved");
                            self.toaster
                                .success(format!("Exportado para {}", path.display()));
                        }
                        Err(e) => {
                            warn!("Could not write export: {}", e);
                            self.toaster.error("Erro ao gravar arquivo exportado");
                        }
                    },
                    Err(e) => self.report(&e, "Erro ao exportar anamnese"),
                }
            }
            Command::Summary(id) => {
                let result = self.backend.generate_summary(&id).await;
                match &result {
                    Ok(_) => self.toaster.success("Resumo gerado com sucesso!"),
                    Err(e) => self.report(e, "Erro ao gerar resumo"),
                }
                if let Some(view) = self.detail.as_mut() {
                    view.finish_summary(result);
                }
            }
        }
    }

    /// Notify a failed call; an expired session sends the user to login
    fn report(&mut self, error: &ApiError, message: &str) {
        warn!("{}: {}", message, error);
        if error.is_unauthorized() {
            self.close_wizard();
            self.context = AuthContext::anonymous();
            self.backend.set_token(None);
            self.route = Route::Login;
            self.toaster.error("Sessão expirada. Faça login novamente.");
        } else {
            self.toaster.error(message);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(frame.area());

        match &self.route {
            Route::Login => self.login.render(frame),
            Route::Dashboard => {
                self.dashboard
                    .render(frame, chunks[0], self.context.user.as_ref());
            }
            Route::Wizard => {
                if let Some(screen) = self.wizard.as_mut() {
                    screen.render(frame, chunks[0]);
                }
            }
            Route::Detail(_) => {
                if let Some(view) = self.detail.as_ref() {
                    view.render(frame, chunks[0]);
                }
            }
        }

        self.toaster.render(frame, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ExportFile, SessionData, User};
    use crate::record::{Anamnese, AnamneseDraft};
    use crate::wizard::WizardStep;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Store {
        records: Vec<Anamnese>,
        searches: Vec<Option<String>>,
        fail_create: bool,
        fail_list: bool,
    }

    /// In-memory backend; `token` is the only accepted session
    #[derive(Clone, Default)]
    struct MemoryBackend {
        token: Option<String>,
        store: Arc<Mutex<Store>>,
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            picture: None,
        }
    }

    fn stored(id: &str, draft: AnamneseDraft) -> Anamnese {
        let now = chrono::Utc::now();
        Anamnese {
            id: id.to_string(),
            user_id: "u1".to_string(),
            record: draft,
            auditoria: None,
            resumo_clinico_ia: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl AnamneseBackend for MemoryBackend {
        fn set_token(&mut self, token: Option<String>) {
            self.token = token;
        }

        fn has_token(&self) -> bool {
            self.token.is_some()
        }

        async fn exchange_session(&self, session_id: &str) -> Result<SessionData, ApiError> {
            if session_id != "good" {
                return Err(ApiError::unauthorized("POST auth/session-data"));
            }
            let u = user();
            Ok(SessionData {
                id: u.id,
                email: u.email,
                name: u.name,
                picture: None,
                session_token: "tok".to_string(),
            })
        }

        async fn current_user(&self) -> Result<User, ApiError> {
            match self.token.as_deref() {
                Some("tok") => Ok(user()),
                _ => Err(ApiError::unauthorized("GET auth/me")),
            }
        }

        async fn logout(&self) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_anamneses(&self, search: Option<&str>) -> Result<Vec<Anamnese>, ApiError> {
            let mut store = self.store.lock().unwrap();
            store.searches.push(search.map(str::to_string));
            if store.fail_list {
                return Err(ApiError::http("GET anamneses", 503, "unavailable"));
            }
            Ok(store.records.clone())
        }

        async fn get_anamnese(&self, id: &str) -> Result<Anamnese, ApiError> {
            let store = self.store.lock().unwrap();
            store
                .records
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| ApiError::not_found(format!("GET anamneses/{}", id)))
        }

        async fn create_anamnese(&self, draft: &AnamneseDraft) -> Result<Anamnese, ApiError> {
            let mut store = self.store.lock().unwrap();
            if store.fail_create {
                return Err(ApiError::http("POST anamneses", 500, "boom"));
            }
            let record = stored("created", draft.clone());
            store.records.push(record.clone());
            Ok(record)
        }

        async fn delete_anamnese(&self, id: &str) -> Result<(), ApiError> {
            self.store.lock().unwrap().records.retain(|r| r.id != id);
            Ok(())
        }

        async fn generate_summary(&self, _id: &str) -> Result<String, ApiError> {
            Ok("Resumo".to_string())
        }

        async fn download_export(
            &self,
            id: &str,
            format: ExportFormat,
        ) -> Result<ExportFile, ApiError> {
            Ok(ExportFile {
                filename: format.default_filename(id),
                bytes: b"data".to_vec(),
            })
        }
    }

    fn app(dir: &TempDir, backend: MemoryBackend) -> App {
        let mut config = Config::default();
        config.paths.state = dir.path().join("state").to_string_lossy().to_string();
        config.paths.exports = dir.path().join("exports").to_string_lossy().to_string();
        App::new(config, Box::new(backend)).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn drain(app: &mut App) {
        while let Some(command) = app.pending.take() {
            app.execute(command).await;
        }
    }

    #[tokio::test]
    async fn test_start_without_session_shows_login() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, MemoryBackend::default());
        app.start(None).await;
        assert_eq!(app.route(), &Route::Login);
        assert!(!app.context().loading);
    }

    #[tokio::test]
    async fn test_pasted_callback_logs_in_and_lists() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::default();
        let store = backend.store.clone();
        let mut app = app(&dir, backend);
        app.start(None).await;

        for c in "http://localhost:3000/#session_id=good".chars() {
            app.handle_key(key(KeyCode::Char(c)), Instant::now());
        }
        app.handle_key(key(KeyCode::Enter), Instant::now());
        drain(&mut app).await;

        assert_eq!(app.route(), &Route::Dashboard);
        assert_eq!(app.context().user.as_ref().map(|u| u.name.as_str()), Some("Ana"));
        assert_eq!(store.lock().unwrap().searches, vec![None]);
    }

    #[tokio::test]
    async fn test_stored_session_restores_dashboard() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, MemoryBackend::default());
        app.start(Some("http://localhost:3000/#session_id=good")).await;
        drain(&mut app).await;

        let mut second = self::app(&dir, MemoryBackend::default());
        second.start(None).await;
        assert_eq!(second.route(), &Route::Dashboard);
    }

    #[tokio::test]
    async fn test_save_navigates_to_detail() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, MemoryBackend::default());
        app.start(Some("#session_id=good")).await;
        drain(&mut app).await;

        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('n')), now);
        assert_eq!(app.route(), &Route::Wizard);
        for _ in 0..WizardStep::COUNT {
            app.handle_key(key(KeyCode::PageDown), now);
        }
        app.handle_key(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            now,
        );
        drain(&mut app).await;

        assert_eq!(app.route(), &Route::Detail("created".to_string()));
        assert!(app.detail.as_ref().and_then(|d| d.record()).is_some());
        assert!(app.wizard.is_none());
    }

    #[tokio::test]
    async fn test_failed_save_stays_in_wizard() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::default();
        backend.store.lock().unwrap().fail_create = true;
        let mut app = app(&dir, backend);
        app.start(Some("#session_id=good")).await;
        drain(&mut app).await;

        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('n')), now);
        for _ in 0..WizardStep::COUNT {
            app.handle_key(key(KeyCode::PageDown), now);
        }
        app.handle_key(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            now,
        );
        drain(&mut app).await;

        assert_eq!(app.route(), &Route::Wizard);
        let toast = app.toaster.current(Instant::now()).map(|t| t.message.clone());
        assert_eq!(toast.as_deref(), Some("Erro ao salvar anamnese"));
    }

    #[tokio::test]
    async fn test_unknown_detail_shows_not_found() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, MemoryBackend::default());
        app.start(Some("#session_id=good")).await;
        drain(&mut app).await;

        app.open_detail("missing".to_string());
        drain(&mut app).await;
        assert!(app.detail.as_ref().is_some_and(|d| d.is_not_found()));
        let toast = app.toaster.current(Instant::now()).map(|t| t.message.clone());
        assert_eq!(toast.as_deref(), Some("Erro ao carregar anamnese"));
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_listed_records() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::default();
        backend
            .store
            .lock()
            .unwrap()
            .records
            .push(stored("a", AnamneseDraft::new()));
        let store = backend.store.clone();
        let mut app = app(&dir, backend);
        app.start(Some("#session_id=good")).await;
        drain(&mut app).await;
        assert_eq!(app.dashboard.records().len(), 1);

        store.lock().unwrap().fail_list = true;
        app.handle_key(key(KeyCode::Char('r')), Instant::now());
        drain(&mut app).await;

        assert_eq!(app.route(), &Route::Dashboard);
        assert_eq!(app.dashboard.records().len(), 1);
        let toast = app.toaster.current(Instant::now()).map(|t| t.message.clone());
        assert_eq!(toast.as_deref(), Some("Erro ao carregar anamneses"));
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, MemoryBackend::default());
        app.start(Some("#session_id=good")).await;
        drain(&mut app).await;

        app.handle_key(key(KeyCode::Char('L')), Instant::now());
        drain(&mut app).await;
        assert_eq!(app.route(), &Route::Login);
        assert!(!app.context().is_authenticated());
        assert!(!dir.path().join("state").join("session.json").exists());
    }

    #[tokio::test]
    async fn test_delete_refetches_list() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::default();
        backend
            .store
            .lock()
            .unwrap()
            .records
            .push(stored("a", AnamneseDraft::new()));
        let store = backend.store.clone();
        let mut app = app(&dir, backend);
        app.start(Some("#session_id=good")).await;
        drain(&mut app).await;
        assert_eq!(app.dashboard.records().len(), 1);

        app.handle_key(key(KeyCode::Char('d')), Instant::now());
        app.handle_key(key(KeyCode::Char('s')), Instant::now());
        drain(&mut app).await;

        assert!(app.dashboard.records().is_empty());
        assert_eq!(store.lock().unwrap().searches.len(), 2);
    }
}
