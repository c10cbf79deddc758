use chrono::Utc;
use imgui::*;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::guard::{self, Access, ADMIN_ONLY, ANY_ROLE, ROLE_ADMIN};
use crate::model::{
    AssignmentId, CustomerId, LoginRequest, LoginResponse, ProjectId, ResourceId, TaskId,
};
use crate::remote::Remote;
use crate::session::{Session, SessionStore};
use crate::support;

mod admin;
mod list;
mod timesheet;
mod toast;
mod widgets;

use admin::{
    AssignmentForm, AssignmentList, CustomerForm, CustomerList, ProjectForm, ProjectList,
    ResourceForm, ResourceList, TaskForm, TaskList,
};
use timesheet::{EditorMode, GridEditor, TimesheetList};
use toast::Toasts;

const REPO_URL: &str = "https://github.com/bengimizrahi/timetrax-console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    NotAuthorized,
    Section(Section),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Resources,
    ResourceForm(Option<ResourceId>),
    Customers,
    CustomerForm(Option<CustomerId>),
    Projects,
    ProjectForm(Option<ProjectId>),
    Tasks,
    TaskForm(Option<TaskId>),
    Assignments,
    AssignmentForm(Option<AssignmentId>),
    Timesheets,
    Timesheet(EditorMode),
}

impl Section {
    /// Role allow-list the guard applies before the section renders. This is
    /// advisory UX; the backend enforces authorization on every request.
    fn allowed_roles(self) -> &'static [i64] {
        match self {
            Section::Timesheets | Section::Timesheet(_) => ANY_ROLE,
            _ => ADMIN_ONLY,
        }
    }

    /// The list screen a section's sidebar entry highlights.
    fn group(self) -> Section {
        match self {
            Section::Resources | Section::ResourceForm(_) => Section::Resources,
            Section::Customers | Section::CustomerForm(_) => Section::Customers,
            Section::Projects | Section::ProjectForm(_) => Section::Projects,
            Section::Tasks | Section::TaskForm(_) => Section::Tasks,
            Section::Assignments | Section::AssignmentForm(_) => Section::Assignments,
            Section::Timesheets | Section::Timesheet(_) => Section::Timesheets,
        }
    }
}

fn home_for(role: i64) -> Section {
    if role == ROLE_ADMIN {
        Section::Resources
    } else {
        Section::Timesheets
    }
}

struct LoginScreen {
    email: String,
    password: String,
    error: Option<String>,
    call: Remote<LoginResponse>,
}

impl LoginScreen {
    fn new() -> Self {
        LoginScreen {
            email: String::new(),
            password: String::new(),
            error: None,
            call: Remote::new(),
        }
    }
}

pub struct Gui {
    api: ApiClient,
    session_store: SessionStore,
    route: Route,
    wants_exit: bool,
    toasts: Toasts,

    login: LoginScreen,
    resources: ResourceList,
    resource_form: ResourceForm,
    customers: CustomerList,
    customer_form: CustomerForm,
    projects: ProjectList,
    project_form: ProjectForm,
    tasks: TaskList,
    task_form: TaskForm,
    assignments: AssignmentList,
    assignment_form: AssignmentForm,
    timesheets: TimesheetList,
    editor: GridEditor,
}

impl Gui {
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let api = ApiClient::new(&config)?;
        let session_store = SessionStore::open(config.session_file.as_str());
        let mut gui = Gui {
            api,
            session_store,
            route: Route::Login,
            wants_exit: false,
            toasts: Toasts::new(),
            login: LoginScreen::new(),
            resources: ResourceList::new(),
            resource_form: ResourceForm::new(),
            customers: CustomerList::new(),
            customer_form: CustomerForm::new(),
            projects: ProjectList::new(),
            project_form: ProjectForm::new(),
            tasks: TaskList::new(),
            task_form: TaskForm::new(),
            assignments: AssignmentList::new(),
            assignment_form: AssignmentForm::new(),
            timesheets: TimesheetList::new(),
            editor: GridEditor::new(),
        };
        // Resume a persisted session when its token still checks out; the
        // guard keeps watching it on every frame after that.
        if let Access::Granted = guard::check(gui.session_store.get(), None, Utc::now()) {
            if let Some(session) = gui.session_store.get() {
                tracing::info!("resuming session for {}", session.email_id);
                let landing = home_for(session.role);
                gui.navigate(Route::Section(landing));
            }
        }
        Ok(gui)
    }

    pub fn run(mut self) {
        support::simple_init("Timetrax Console", move |run, ui| {
            unsafe {
                imgui::sys::igStyleColorsLight(std::ptr::null_mut());
            }

            let display_size = ui.io().display_size;

            if let Some(window) = ui
                .window("Timetrax")
                .position([0.0, 0.0], Condition::Always)
                .size(display_size, Condition::Always)
                .title_bar(false)
                .resizable(false)
                .movable(false)
                .scroll_bar(false)
                .collapsible(false)
                .bring_to_front_on_focus(false)
                .nav_focus(false)
                .menu_bar(true)
                .begin()
            {
                self.draw(ui);
                window.end();
            }
            self.toasts.draw(ui);
            if self.wants_exit {
                *run = false;
            }
        });
    }

    fn draw(&mut self, ui: &Ui) {
        match self.route {
            Route::Login => self.draw_login(ui),
            Route::NotAuthorized => self.draw_not_authorized(ui),
            Route::Section(section) => {
                let verdict = guard::check(
                    self.session_store.get(),
                    Some(section.allowed_roles()),
                    Utc::now(),
                );
                match verdict {
                    Access::Granted => self.draw_dashboard(ui, section),
                    Access::ToLogin { clear_session } => {
                        if clear_session {
                            self.session_store.clear();
                        }
                        self.route = Route::Login;
                    }
                    Access::ToNotAuthorized => {
                        self.route = Route::NotAuthorized;
                    }
                }
            }
        }
    }

    /// Switches route; entering a section restarts its backing fetches, so a
    /// list is always fresh when it appears.
    fn navigate(&mut self, route: Route) {
        if let Route::Section(section) = route {
            if let Some(session) = self.session_store.get().cloned() {
                let token = session.access_token;
                match section {
                    Section::Resources => self.resources.enter(&self.api, &token),
                    Section::ResourceForm(id) => self.resource_form.enter(id, &self.api, &token),
                    Section::Customers => self.customers.enter(&self.api, &token),
                    Section::CustomerForm(id) => self.customer_form.enter(id, &self.api, &token),
                    Section::Projects => self.projects.enter(&self.api, &token),
                    Section::ProjectForm(id) => self.project_form.enter(id, &self.api, &token),
                    Section::Tasks => self.tasks.enter(&self.api, &token),
                    Section::TaskForm(id) => self.task_form.enter(id, &self.api, &token),
                    Section::Assignments => self.assignments.enter(&self.api, &token),
                    Section::AssignmentForm(id) => {
                        self.assignment_form.enter(id, &self.api, &token)
                    }
                    Section::Timesheets => {
                        self.timesheets.enter(&self.api, &token, session.resource_id)
                    }
                    Section::Timesheet(mode) => {
                        self.editor
                            .enter(mode, &self.api, &token, session.resource_id)
                    }
                }
            }
        }
        self.route = route;
    }

    fn logout(&mut self) {
        tracing::info!("logging out");
        self.session_store.clear();
        self.login = LoginScreen::new();
        self.route = Route::Login;
    }

    fn submit_login(&mut self) {
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        if email.is_empty() || password.is_empty() {
            self.login.error = Some("Email and password are required".to_string());
            return;
        }
        self.login.error = None;
        let api = self.api.clone();
        self.login.call.start(move || {
            api.login(&LoginRequest {
                email_id: email,
                password,
            })
        });
    }

    fn draw_login(&mut self, ui: &Ui) {
        self.login.call.poll();
        if let Some(response) = self.login.call.take_ready() {
            let session = Session::from(response);
            let landing = home_for(session.role);
            match self.session_store.set(session) {
                Ok(()) => {
                    self.login = LoginScreen::new();
                    self.navigate(Route::Section(landing));
                    return;
                }
                Err(e) => {
                    self.login.error = Some(format!("Failed to persist session: {}", e));
                }
            }
        }
        if let Some(err) = self.login.call.take_failed() {
            // Bad credentials stay inline on the form, no redirect.
            self.login.error = Some(err.to_string());
        }

        let display_size = ui.io().display_size;
        ui.set_cursor_pos([
            (display_size[0] - 380.0) * 0.5,
            (display_size[1] - 240.0) * 0.5,
        ]);
        if let Some(child) = ui.child_window("##login").size([380.0, 240.0]).begin() {
            ui.text("Sign in to Timetrax");
            ui.separator();
            ui.set_next_item_width(280.0);
            ui.input_text("Email", &mut self.login.email)
                .hint("name@company.com")
                .build();
            ui.set_next_item_width(280.0);
            let entered = ui
                .input_text("Password", &mut self.login.password)
                .password(true)
                .enter_returns_true(true)
                .build();
            if let Some(error) = &self.login.error {
                ui.text_colored([0.75, 0.1, 0.1, 1.0], error);
            }
            let busy = self.login.call.is_loading();
            {
                let _disabled = ui.begin_disabled(busy);
                if ui.button("Login") || (entered && !busy) {
                    self.submit_login();
                }
            }
            child.end();
        }
    }

    fn draw_not_authorized(&mut self, ui: &Ui) {
        ui.text("Not authorized");
        ui.separator();
        ui.text("Your role does not permit viewing that page.");
        if ui.button("Go to Timesheets") {
            self.navigate(Route::Section(Section::Timesheets));
        }
        ui.same_line();
        if ui.button("Logout") {
            self.logout();
        }
    }

    fn draw_dashboard(&mut self, ui: &Ui, section: Section) {
        let session = match self.session_store.get() {
            Some(session) => session.clone(),
            None => return,
        };
        let mut nav: Option<Route> = None;
        let mut logout = false;

        if let Some(menu_bar) = ui.begin_menu_bar() {
            if let Some(_file_menu) = ui.begin_menu("File") {
                if ui.menu_item("Logout") {
                    logout = true;
                }
                if ui.menu_item("Exit") {
                    self.wants_exit = true;
                }
            }
            if let Some(_help_menu) = ui.begin_menu("Help") {
                if ui.menu_item("About") {
                    if let Err(e) = webbrowser::open(REPO_URL) {
                        tracing::warn!("failed to open browser: {}", e);
                    }
                }
            }
            menu_bar.end();
        }

        if let Some(sidebar) = ui.child_window("##sidebar").size([200.0, 0.0]).begin() {
            ui.text(session.display_name());
            ui.text_disabled(&session.role_name);
            ui.separator();
            let entries: &[(&str, Section)] = &[
                ("Resources", Section::Resources),
                ("Customers", Section::Customers),
                ("Projects", Section::Projects),
                ("Tasks", Section::Tasks),
                ("Assignments", Section::Assignments),
                ("Timesheets", Section::Timesheets),
            ];
            for (label, target) in entries {
                // Admin-only entries are hidden from other roles; the guard
                // would bounce them anyway.
                if *target != Section::Timesheets && session.role != ROLE_ADMIN {
                    continue;
                }
                let selected = section.group() == *target;
                if ui.selectable_config(*label).selected(selected).build() && !selected {
                    nav = Some(Route::Section(*target));
                }
            }
            ui.separator();
            if ui.button("Logout") {
                logout = true;
            }
            sidebar.end();
        }
        ui.same_line();
        if let Some(content) = ui.child_window("##content").begin() {
            let token = session.access_token.as_str();
            let me = session.resource_id;
            match section {
                Section::Resources => self.resources.draw(ui, &mut self.toasts, &mut nav),
                Section::ResourceForm(_) => {
                    self.resource_form
                        .draw(ui, &self.api, token, me, &mut self.toasts, &mut nav)
                }
                Section::Customers => self.customers.draw(ui, &mut self.toasts, &mut nav),
                Section::CustomerForm(_) => {
                    self.customer_form
                        .draw(ui, &self.api, token, me, &mut self.toasts, &mut nav)
                }
                Section::Projects => {
                    self.projects
                        .draw(ui, &self.api, token, &mut self.toasts, &mut nav)
                }
                Section::ProjectForm(_) => {
                    self.project_form
                        .draw(ui, &self.api, token, me, &mut self.toasts, &mut nav)
                }
                Section::Tasks => {
                    self.tasks
                        .draw(ui, &self.api, token, &mut self.toasts, &mut nav)
                }
                Section::TaskForm(_) => {
                    self.task_form
                        .draw(ui, &self.api, token, me, &mut self.toasts, &mut nav)
                }
                Section::Assignments => {
                    self.assignments
                        .draw(ui, &self.api, token, &mut self.toasts, &mut nav)
                }
                Section::AssignmentForm(_) => {
                    self.assignment_form
                        .draw(ui, &self.api, token, me, &mut self.toasts, &mut nav)
                }
                Section::Timesheets => self.timesheets.draw(ui, &mut self.toasts, &mut nav),
                Section::Timesheet(_) => {
                    self.editor
                        .draw(ui, &self.api, token, &mut self.toasts, &mut nav)
                }
            }
            content.end();
        }

        if logout {
            self.logout();
        } else if let Some(route) = nav {
            self.navigate(route);
        }
    }
}
