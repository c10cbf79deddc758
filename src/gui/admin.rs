use imgui::{TableFlags, Ui};

use crate::api::ApiClient;
use crate::guard::{ROLE_ADMIN, ROLE_USER};
use crate::gui::list::{contains_ci, draw_filter, draw_pager, ListView};
use crate::gui::toast::Toasts;
use crate::gui::widgets::{id_combo, parse_date, poll_options, text_field};
use crate::gui::{Route, Section};
use crate::model::{
    Assignment, AssignmentId, Customer, CustomerId, Project, ProjectId, Resource, ResourceId,
    Task, TaskId,
};
use crate::remote::Remote;

fn list_flags() -> TableFlags {
    TableFlags::BORDERS | TableFlags::ROW_BG
}

fn active_label(active: bool) -> &'static str {
    if active {
        "Yes"
    } else {
        "No"
    }
}

fn role_label(role: i64) -> &'static str {
    if role == ROLE_ADMIN {
        "Admin"
    } else {
        "User"
    }
}

fn customer_options(customers: &[Customer]) -> Vec<(i64, String)> {
    customers
        .iter()
        .filter_map(|c| c.customer_id.map(|id| (id, c.customer_name.clone())))
        .collect()
}

fn project_options(projects: &[Project]) -> Vec<(i64, String)> {
    projects
        .iter()
        .filter_map(|p| p.project_id.map(|id| (id, p.project_name.clone())))
        .collect()
}

fn resource_options(resources: &[Resource]) -> Vec<(i64, String)> {
    resources
        .iter()
        .filter_map(|r| {
            r.resource_id
                .map(|id| (id, format!("{} {}", r.first_name, r.last_name)))
        })
        .collect()
}

fn option_name(options: &[(i64, String)], id: i64) -> String {
    options
        .iter()
        .find(|(option_id, _)| *option_id == id)
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

// ---------------------------------------------------------------------------
// Resources

pub struct ResourceList {
    pub view: ListView<Resource>,
}

impl ResourceList {
    pub fn new() -> Self {
        ResourceList {
            view: ListView::new(),
        }
    }

    pub fn enter(&mut self, api: &ApiClient, token: &str) {
        let api = api.clone();
        let token = token.to_string();
        self.view.refetch(move || api.resources(&token));
    }

    pub fn draw(&mut self, ui: &Ui, toasts: &mut Toasts, nav: &mut Option<Route>) {
        if let Some(err) = self.view.poll() {
            toasts.error(format!("Failed to load resources: {}", err));
        }
        ui.text("Resources");
        ui.separator();
        draw_filter(ui, &mut self.view.filter, &mut self.view.page);
        ui.same_line();
        if ui.button("Add Resource") {
            *nav = Some(Route::Section(Section::ResourceForm(None)));
        }

        let (rows, pages) = self.view.visible(|r, f| {
            contains_ci(
                &[r.first_name.as_str(), r.last_name.as_str(), r.email_id.as_str()],
                f,
            )
        });
        if let Some(_table) = ui.begin_table_with_flags("##resources", 6, list_flags()) {
            ui.table_setup_column("Name");
            ui.table_setup_column("Email");
            ui.table_setup_column("Phone");
            ui.table_setup_column("Role");
            ui.table_setup_column("Active");
            ui.table_setup_column("##actions");
            ui.table_headers_row();
            for resource in rows {
                ui.table_next_row();
                ui.table_next_column();
                ui.text(format!("{} {}", resource.first_name, resource.last_name));
                ui.table_next_column();
                ui.text(&resource.email_id);
                ui.table_next_column();
                ui.text(&resource.phone_number);
                ui.table_next_column();
                ui.text(role_label(resource.role));
                ui.table_next_column();
                ui.text(active_label(resource.active));
                ui.table_next_column();
                if let Some(id) = resource.resource_id {
                    if ui.button(format!("Edit##resource{}", id)) {
                        *nav = Some(Route::Section(Section::ResourceForm(Some(id))));
                    }
                }
            }
        }
        draw_pager(ui, &mut self.view.page, pages);
        if self.view.is_loading() {
            ui.text_disabled("Loading...");
        }
    }
}

pub struct ResourceForm {
    id: Option<ResourceId>,
    load: Remote<Resource>,
    submit: Remote<()>,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password: String,
    address_line1: String,
    address_line2: String,
    city: String,
    state: String,
    zipcode: String,
    country: String,
    role: i64,
    active: bool,
}

impl ResourceForm {
    pub fn new() -> Self {
        ResourceForm {
            id: None,
            load: Remote::new(),
            submit: Remote::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            zipcode: String::new(),
            country: String::new(),
            role: ROLE_USER,
            active: true,
        }
    }

    pub fn enter(&mut self, id: Option<ResourceId>, api: &ApiClient, token: &str) {
        *self = ResourceForm::new();
        self.id = id;
        if let Some(id) = id {
            let api = api.clone();
            let token = token.to_string();
            self.load.start(move || api.resource(&token, id));
        }
    }

    fn populate(&mut self, resource: Resource) {
        self.first_name = resource.first_name;
        self.last_name = resource.last_name;
        self.email = resource.email_id;
        self.phone = resource.phone_number;
        self.address_line1 = resource.address_line1;
        self.address_line2 = resource.address_line2;
        self.city = resource.city;
        self.state = resource.state;
        self.zipcode = resource.zipcode;
        self.country = resource.country;
        self.role = resource.role;
        self.active = resource.active;
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        me: ResourceId,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        self.load.poll();
        if let Some(resource) = self.load.take_ready() {
            self.populate(resource);
        }
        if let Some(err) = self.load.take_failed() {
            toasts.error(format!("Failed to load resource: {}", err));
        }
        self.submit.poll();
        if self.submit.take_ready().is_some() {
            toasts.success("Resource saved");
            *nav = Some(Route::Section(Section::Resources));
        }
        if let Some(err) = self.submit.take_failed() {
            toasts.error(err.to_string());
        }

        ui.text(if self.id.is_some() {
            "Update Resource"
        } else {
            "Add Resource"
        });
        ui.separator();
        text_field(ui, "First name", &mut self.first_name);
        text_field(ui, "Last name", &mut self.last_name);
        text_field(ui, "Email", &mut self.email);
        if self.id.is_none() {
            ui.set_next_item_width(280.0);
            ui.input_text("Password", &mut self.password)
                .password(true)
                .build();
        }
        text_field(ui, "Phone", &mut self.phone);
        text_field(ui, "Address line 1", &mut self.address_line1);
        text_field(ui, "Address line 2", &mut self.address_line2);
        text_field(ui, "City", &mut self.city);
        text_field(ui, "State", &mut self.state);
        text_field(ui, "Zip code", &mut self.zipcode);
        text_field(ui, "Country", &mut self.country);
        ui.set_next_item_width(280.0);
        let roles = [
            (ROLE_ADMIN, "Admin".to_string()),
            (ROLE_USER, "User".to_string()),
        ];
        if let Some(role) = id_combo(ui, "Role", &roles, Some(self.role), "Role") {
            self.role = role;
        }
        ui.checkbox("Active", &mut self.active);

        ui.separator();
        let busy = self.submit.is_loading();
        let _disabled = ui.begin_disabled(busy);
        if ui.button("Save") {
            self.save(api, token, me, toasts);
        }
        ui.same_line();
        if ui.button("Cancel") {
            *nav = Some(Route::Section(Section::Resources));
        }
    }

    fn save(&mut self, api: &ApiClient, token: &str, me: ResourceId, toasts: &mut Toasts) {
        let creating = self.id.is_none();
        let missing_required = self.first_name.trim().is_empty()
            || self.email.trim().is_empty()
            || (creating && self.password.trim().is_empty());
        if missing_required {
            toasts.error(if creating {
                "First name, email and password are required"
            } else {
                "First name and email are required"
            });
            return;
        }
        let resource = Resource {
            resource_id: self.id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: self.phone.trim().to_string(),
            email_id: self.email.trim().to_string(),
            password: if creating {
                Some(self.password.clone())
            } else {
                None
            },
            address_line1: self.address_line1.clone(),
            address_line2: self.address_line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zipcode: self.zipcode.clone(),
            country: self.country.clone(),
            role: self.role,
            active: self.active,
            created_by: if creating { Some(me) } else { None },
            modified_by: Some(me),
        };
        let api = api.clone();
        let token = token.to_string();
        match self.id {
            Some(id) => self
                .submit
                .start(move || api.update_resource(&token, id, &resource)),
            None => self
                .submit
                .start(move || api.create_resource(&token, &resource)),
        }
    }
}

// ---------------------------------------------------------------------------
// Customers

pub struct CustomerList {
    pub view: ListView<Customer>,
}

impl CustomerList {
    pub fn new() -> Self {
        CustomerList {
            view: ListView::new(),
        }
    }

    pub fn enter(&mut self, api: &ApiClient, token: &str) {
        let api = api.clone();
        let token = token.to_string();
        self.view.refetch(move || api.customers(&token));
    }

    pub fn draw(&mut self, ui: &Ui, toasts: &mut Toasts, nav: &mut Option<Route>) {
        if let Some(err) = self.view.poll() {
            toasts.error(format!("Failed to load customers: {}", err));
        }
        ui.text("Customers");
        ui.separator();
        draw_filter(ui, &mut self.view.filter, &mut self.view.page);
        ui.same_line();
        if ui.button("Add Customer") {
            *nav = Some(Route::Section(Section::CustomerForm(None)));
        }

        let (rows, pages) = self.view.visible(|c, f| {
            contains_ci(
                &[c.customer_name.as_str(), c.email.as_str(), c.city.as_str()],
                f,
            )
        });
        if let Some(_table) = ui.begin_table_with_flags("##customers", 6, list_flags()) {
            ui.table_setup_column("Name");
            ui.table_setup_column("Email");
            ui.table_setup_column("Phone");
            ui.table_setup_column("City");
            ui.table_setup_column("Active");
            ui.table_setup_column("##actions");
            ui.table_headers_row();
            for customer in rows {
                ui.table_next_row();
                ui.table_next_column();
                ui.text(&customer.customer_name);
                ui.table_next_column();
                ui.text(&customer.email);
                ui.table_next_column();
                ui.text(&customer.phone_number);
                ui.table_next_column();
                ui.text(&customer.city);
                ui.table_next_column();
                ui.text(active_label(customer.active));
                ui.table_next_column();
                if let Some(id) = customer.customer_id {
                    if ui.button(format!("Edit##customer{}", id)) {
                        *nav = Some(Route::Section(Section::CustomerForm(Some(id))));
                    }
                }
            }
        }
        draw_pager(ui, &mut self.view.page, pages);
        if self.view.is_loading() {
            ui.text_disabled("Loading...");
        }
    }
}

pub struct CustomerForm {
    id: Option<CustomerId>,
    load: Remote<Customer>,
    submit: Remote<()>,
    name: String,
    email: String,
    phone: String,
    address_line1: String,
    address_line2: String,
    city: String,
    state: String,
    zipcode: String,
    country: String,
    active: bool,
}

impl CustomerForm {
    pub fn new() -> Self {
        CustomerForm {
            id: None,
            load: Remote::new(),
            submit: Remote::new(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            zipcode: String::new(),
            country: String::new(),
            active: true,
        }
    }

    pub fn enter(&mut self, id: Option<CustomerId>, api: &ApiClient, token: &str) {
        *self = CustomerForm::new();
        self.id = id;
        if let Some(id) = id {
            let api = api.clone();
            let token = token.to_string();
            self.load.start(move || api.customer(&token, id));
        }
    }

    fn populate(&mut self, customer: Customer) {
        self.name = customer.customer_name;
        self.email = customer.email;
        self.phone = customer.phone_number;
        self.address_line1 = customer.address_line1;
        self.address_line2 = customer.address_line2;
        self.city = customer.city;
        self.state = customer.state;
        self.zipcode = customer.zipcode;
        self.country = customer.country;
        self.active = customer.active;
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        me: ResourceId,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        self.load.poll();
        if let Some(customer) = self.load.take_ready() {
            self.populate(customer);
        }
        if let Some(err) = self.load.take_failed() {
            toasts.error(format!("Failed to load customer: {}", err));
        }
        self.submit.poll();
        if self.submit.take_ready().is_some() {
            toasts.success("Customer saved");
            *nav = Some(Route::Section(Section::Customers));
        }
        if let Some(err) = self.submit.take_failed() {
            toasts.error(err.to_string());
        }

        ui.text(if self.id.is_some() {
            "Update Customer"
        } else {
            "Add Customer"
        });
        ui.separator();
        text_field(ui, "Customer name", &mut self.name);
        text_field(ui, "Email", &mut self.email);
        text_field(ui, "Phone", &mut self.phone);
        text_field(ui, "Address line 1", &mut self.address_line1);
        text_field(ui, "Address line 2", &mut self.address_line2);
        text_field(ui, "City", &mut self.city);
        text_field(ui, "State", &mut self.state);
        text_field(ui, "Zip code", &mut self.zipcode);
        text_field(ui, "Country", &mut self.country);
        ui.checkbox("Active", &mut self.active);

        ui.separator();
        let busy = self.submit.is_loading();
        let _disabled = ui.begin_disabled(busy);
        if ui.button("Save") {
            if self.name.trim().is_empty() {
                toasts.error("Customer name is required");
            } else {
                let customer = Customer {
                    customer_id: self.id,
                    customer_name: self.name.trim().to_string(),
                    email: self.email.trim().to_string(),
                    phone_number: self.phone.trim().to_string(),
                    address_line1: self.address_line1.clone(),
                    address_line2: self.address_line2.clone(),
                    city: self.city.clone(),
                    state: self.state.clone(),
                    zipcode: self.zipcode.clone(),
                    country: self.country.clone(),
                    active: self.active,
                    created_by: if self.id.is_none() { Some(me) } else { None },
                    modified_by: Some(me),
                };
                let api = api.clone();
                let token = token.to_string();
                match self.id {
                    Some(id) => self
                        .submit
                        .start(move || api.update_customer(&token, id, &customer)),
                    None => self
                        .submit
                        .start(move || api.create_customer(&token, &customer)),
                }
            }
        }
        ui.same_line();
        if ui.button("Cancel") {
            *nav = Some(Route::Section(Section::Customers));
        }
    }
}

// ---------------------------------------------------------------------------
// Projects

pub struct ProjectList {
    pub view: ListView<Project>,
    customers: Remote<Vec<Customer>>,
    selected_customer: Option<CustomerId>,
}

impl ProjectList {
    pub fn new() -> Self {
        ProjectList {
            view: ListView::new(),
            customers: Remote::new(),
            selected_customer: None,
        }
    }

    pub fn enter(&mut self, api: &ApiClient, token: &str) {
        self.selected_customer = None;
        {
            let api = api.clone();
            let token = token.to_string();
            self.customers.start(move || api.active_customers(&token));
        }
        self.refetch(api, token);
    }

    fn refetch(&mut self, api: &ApiClient, token: &str) {
        let api = api.clone();
        let token = token.to_string();
        match self.selected_customer {
            Some(customer_id) => self
                .view
                .refetch(move || api.projects_by_customer(&token, customer_id)),
            None => self.view.refetch(move || api.projects(&token)),
        }
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        poll_options(&mut self.customers, "customers", toasts);
        if let Some(err) = self.view.poll() {
            toasts.error(format!("Failed to load projects: {}", err));
        }
        ui.text("Projects");
        ui.separator();

        let options = customer_options(self.customers.value().map(Vec::as_slice).unwrap_or(&[]));
        let preview = self
            .selected_customer
            .map(|id| option_name(&options, id))
            .unwrap_or_else(|| "All customers".to_string());
        let mut changed = false;
        ui.set_next_item_width(240.0);
        if let Some(_combo) = ui.begin_combo("##customer_filter", &preview) {
            if ui
                .selectable_config("All customers")
                .selected(self.selected_customer.is_none())
                .build()
                && self.selected_customer.is_some()
            {
                self.selected_customer = None;
                changed = true;
            }
            for (id, name) in &options {
                let selected = self.selected_customer == Some(*id);
                if ui
                    .selectable_config(format!("{}##{}", name, id))
                    .selected(selected)
                    .build()
                    && !selected
                {
                    self.selected_customer = Some(*id);
                    changed = true;
                }
            }
        }
        if changed {
            // The refetch supersedes any fetch still in flight, so rapid
            // selection changes cannot leave a stale customer's projects up.
            self.refetch(api, token);
        }
        ui.same_line();
        draw_filter(ui, &mut self.view.filter, &mut self.view.page);
        ui.same_line();
        if ui.button("Add Project") {
            *nav = Some(Route::Section(Section::ProjectForm(None)));
        }

        let (rows, pages) = self.view.visible(|p, f| {
            let customer_name = p
                .customer
                .as_ref()
                .map(|c| c.customer_name.as_str())
                .unwrap_or("");
            contains_ci(
                &[
                    p.project_name.as_str(),
                    customer_name,
                    p.project_description.as_str(),
                ],
                f,
            )
        });
        if let Some(_table) = ui.begin_table_with_flags("##projects", 5, list_flags()) {
            ui.table_setup_column("Project");
            ui.table_setup_column("Customer");
            ui.table_setup_column("Description");
            ui.table_setup_column("Active");
            ui.table_setup_column("##actions");
            ui.table_headers_row();
            for project in rows {
                ui.table_next_row();
                ui.table_next_column();
                ui.text(&project.project_name);
                ui.table_next_column();
                ui.text(
                    project
                        .customer
                        .as_ref()
                        .map(|c| c.customer_name.as_str())
                        .unwrap_or("-"),
                );
                ui.table_next_column();
                ui.text(&project.project_description);
                ui.table_next_column();
                ui.text(active_label(project.active));
                ui.table_next_column();
                if let Some(id) = project.project_id {
                    if ui.button(format!("Edit##project{}", id)) {
                        *nav = Some(Route::Section(Section::ProjectForm(Some(id))));
                    }
                }
            }
        }
        draw_pager(ui, &mut self.view.page, pages);
        if self.view.is_loading() {
            ui.text_disabled("Loading...");
        }
    }
}

pub struct ProjectForm {
    id: Option<ProjectId>,
    load: Remote<Project>,
    submit: Remote<()>,
    customers: Remote<Vec<Customer>>,
    selected_customer: Option<CustomerId>,
    name: String,
    description: String,
    active: bool,
}

impl ProjectForm {
    pub fn new() -> Self {
        ProjectForm {
            id: None,
            load: Remote::new(),
            submit: Remote::new(),
            customers: Remote::new(),
            selected_customer: None,
            name: String::new(),
            description: String::new(),
            active: true,
        }
    }

    pub fn enter(&mut self, id: Option<ProjectId>, api: &ApiClient, token: &str) {
        *self = ProjectForm::new();
        self.id = id;
        {
            let api = api.clone();
            let token = token.to_string();
            self.customers.start(move || api.active_customers(&token));
        }
        if let Some(id) = id {
            let api = api.clone();
            let token = token.to_string();
            self.load.start(move || api.project(&token, id));
        }
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        me: ResourceId,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        poll_options(&mut self.customers, "customers", toasts);
        self.load.poll();
        if let Some(project) = self.load.take_ready() {
            self.name = project.project_name;
            self.description = project.project_description;
            self.active = project.active;
            self.selected_customer = project.customer.and_then(|c| c.customer_id);
        }
        if let Some(err) = self.load.take_failed() {
            toasts.error(format!("Failed to load project: {}", err));
        }
        self.submit.poll();
        if self.submit.take_ready().is_some() {
            toasts.success("Project saved");
            *nav = Some(Route::Section(Section::Projects));
        }
        if let Some(err) = self.submit.take_failed() {
            toasts.error(err.to_string());
        }

        ui.text(if self.id.is_some() {
            "Update Project"
        } else {
            "Add Project"
        });
        ui.separator();
        let options = customer_options(self.customers.value().map(Vec::as_slice).unwrap_or(&[]));
        ui.set_next_item_width(280.0);
        if let Some(picked) = id_combo(
            ui,
            "Customer",
            &options,
            self.selected_customer,
            "Select a customer",
        ) {
            self.selected_customer = Some(picked);
        }
        text_field(ui, "Project name", &mut self.name);
        text_field(ui, "Description", &mut self.description);
        ui.checkbox("Active", &mut self.active);

        ui.separator();
        let busy = self.submit.is_loading();
        let _disabled = ui.begin_disabled(busy);
        if ui.button("Save") {
            match (self.selected_customer, self.name.trim().is_empty()) {
                (None, _) => toasts.error("A customer must be selected"),
                (_, true) => toasts.error("Project name is required"),
                (Some(customer_id), false) => {
                    let project = Project {
                        project_id: self.id,
                        project_name: self.name.trim().to_string(),
                        project_description: self.description.clone(),
                        active: self.active,
                        customer: None,
                        created_by: if self.id.is_none() { Some(me) } else { None },
                        modified_by: Some(me),
                    };
                    let api = api.clone();
                    let token = token.to_string();
                    match self.id {
                        Some(id) => self.submit.start(move || {
                            api.update_project(&token, id, customer_id, &project)
                        }),
                        None => self
                            .submit
                            .start(move || api.create_project(&token, customer_id, &project)),
                    }
                }
            }
        }
        ui.same_line();
        if ui.button("Cancel") {
            *nav = Some(Route::Section(Section::Projects));
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks

pub struct TaskList {
    pub view: ListView<Task>,
    projects: Remote<Vec<Project>>,
    selected_project: Option<ProjectId>,
}

impl TaskList {
    pub fn new() -> Self {
        TaskList {
            view: ListView::new(),
            projects: Remote::new(),
            selected_project: None,
        }
    }

    pub fn enter(&mut self, api: &ApiClient, token: &str) {
        self.selected_project = None;
        self.view.reset();
        let api = api.clone();
        let token = token.to_string();
        self.projects.start(move || api.projects(&token));
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        poll_options(&mut self.projects, "projects", toasts);
        if let Some(err) = self.view.poll() {
            toasts.error(format!("Failed to load tasks: {}", err));
        }
        ui.text("Tasks");
        ui.separator();

        let options = project_options(self.projects.value().map(Vec::as_slice).unwrap_or(&[]));
        ui.set_next_item_width(240.0);
        if let Some(picked) = id_combo(
            ui,
            "##task_project",
            &options,
            self.selected_project,
            "Select a project",
        ) {
            self.selected_project = Some(picked);
            let api = api.clone();
            let token = token.to_string();
            self.view
                .refetch(move || api.tasks_by_project(&token, picked));
        }
        ui.same_line();
        draw_filter(ui, &mut self.view.filter, &mut self.view.page);
        ui.same_line();
        if ui.button("Add Task") {
            *nav = Some(Route::Section(Section::TaskForm(None)));
        }

        if self.selected_project.is_none() {
            ui.text_disabled("Select a project to list its tasks.");
            return;
        }

        let (rows, pages) = self
            .view
            .visible(|t, f| contains_ci(&[t.task_name.as_str()], f));
        if let Some(_table) = ui.begin_table_with_flags("##tasks", 4, list_flags()) {
            ui.table_setup_column("Task");
            ui.table_setup_column("Project");
            ui.table_setup_column("Active");
            ui.table_setup_column("##actions");
            ui.table_headers_row();
            for task in rows {
                ui.table_next_row();
                ui.table_next_column();
                ui.text(&task.task_name);
                ui.table_next_column();
                ui.text(option_name(&options, task.project_id));
                ui.table_next_column();
                ui.text(active_label(task.active));
                ui.table_next_column();
                if let Some(id) = task.task_id {
                    if ui.button(format!("Edit##task{}", id)) {
                        *nav = Some(Route::Section(Section::TaskForm(Some(id))));
                    }
                }
            }
        }
        draw_pager(ui, &mut self.view.page, pages);
        if self.view.is_loading() {
            ui.text_disabled("Loading...");
        }
    }
}

pub struct TaskForm {
    id: Option<TaskId>,
    load: Remote<Task>,
    submit: Remote<()>,
    projects: Remote<Vec<Project>>,
    selected_project: Option<ProjectId>,
    name: String,
    active: bool,
}

impl TaskForm {
    pub fn new() -> Self {
        TaskForm {
            id: None,
            load: Remote::new(),
            submit: Remote::new(),
            projects: Remote::new(),
            selected_project: None,
            name: String::new(),
            active: true,
        }
    }

    pub fn enter(&mut self, id: Option<TaskId>, api: &ApiClient, token: &str) {
        *self = TaskForm::new();
        self.id = id;
        {
            let api = api.clone();
            let token = token.to_string();
            self.projects.start(move || api.projects(&token));
        }
        if let Some(id) = id {
            let api = api.clone();
            let token = token.to_string();
            self.load.start(move || api.task(&token, id));
        }
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        me: ResourceId,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        poll_options(&mut self.projects, "projects", toasts);
        self.load.poll();
        if let Some(task) = self.load.take_ready() {
            self.name = task.task_name;
            self.active = task.active;
            self.selected_project = Some(task.project_id);
        }
        if let Some(err) = self.load.take_failed() {
            toasts.error(format!("Failed to load task: {}", err));
        }
        self.submit.poll();
        if self.submit.take_ready().is_some() {
            toasts.success("Task saved");
            *nav = Some(Route::Section(Section::Tasks));
        }
        if let Some(err) = self.submit.take_failed() {
            toasts.error(err.to_string());
        }

        ui.text(if self.id.is_some() {
            "Update Task"
        } else {
            "Add Task"
        });
        ui.separator();
        let options = project_options(self.projects.value().map(Vec::as_slice).unwrap_or(&[]));
        ui.set_next_item_width(280.0);
        if let Some(picked) = id_combo(
            ui,
            "Project",
            &options,
            self.selected_project,
            "Select a project",
        ) {
            self.selected_project = Some(picked);
        }
        text_field(ui, "Task name", &mut self.name);
        ui.checkbox("Active", &mut self.active);

        ui.separator();
        let busy = self.submit.is_loading();
        let _disabled = ui.begin_disabled(busy);
        if ui.button("Save") {
            match (self.selected_project, self.name.trim().is_empty()) {
                (None, _) => toasts.error("A project must be selected"),
                (_, true) => toasts.error("Task name is required"),
                (Some(project_id), false) => {
                    let task = Task {
                        task_id: self.id,
                        task_name: self.name.trim().to_string(),
                        active: self.active,
                        project_id,
                        created_by: if self.id.is_none() { Some(me) } else { None },
                        modified_by: Some(me),
                    };
                    let api = api.clone();
                    let token = token.to_string();
                    match self.id {
                        Some(id) => self.submit.start(move || api.update_task(&token, id, &task)),
                        None => self.submit.start(move || api.create_task(&token, &task)),
                    }
                }
            }
        }
        ui.same_line();
        if ui.button("Cancel") {
            *nav = Some(Route::Section(Section::Tasks));
        }
    }
}

// ---------------------------------------------------------------------------
// Assignments

pub struct AssignmentList {
    pub view: ListView<Assignment>,
    projects: Remote<Vec<Project>>,
    selected_project: Option<ProjectId>,
}

impl AssignmentList {
    pub fn new() -> Self {
        AssignmentList {
            view: ListView::new(),
            projects: Remote::new(),
            selected_project: None,
        }
    }

    pub fn enter(&mut self, api: &ApiClient, token: &str) {
        self.selected_project = None;
        self.view.reset();
        let api = api.clone();
        let token = token.to_string();
        self.projects.start(move || api.projects(&token));
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        poll_options(&mut self.projects, "projects", toasts);
        if let Some(err) = self.view.poll() {
            toasts.error(format!("Failed to load assignments: {}", err));
        }
        ui.text("Assignments");
        ui.separator();

        let options = project_options(self.projects.value().map(Vec::as_slice).unwrap_or(&[]));
        ui.set_next_item_width(240.0);
        if let Some(picked) = id_combo(
            ui,
            "##assignment_project",
            &options,
            self.selected_project,
            "Select a project",
        ) {
            self.selected_project = Some(picked);
            let api = api.clone();
            let token = token.to_string();
            self.view
                .refetch(move || api.assignments_by_project(&token, picked));
        }
        ui.same_line();
        draw_filter(ui, &mut self.view.filter, &mut self.view.page);
        ui.same_line();
        if ui.button("Assign Resource") {
            *nav = Some(Route::Section(Section::AssignmentForm(None)));
        }

        if self.selected_project.is_none() {
            ui.text_disabled("Select a project to list its assignments.");
            return;
        }

        let (rows, pages) = self.view.visible(|a, f| {
            contains_ci(
                &[
                    a.resource_name.as_deref().unwrap_or(""),
                    a.project_name.as_deref().unwrap_or(""),
                ],
                f,
            )
        });
        if let Some(_table) = ui.begin_table_with_flags("##assignments", 5, list_flags()) {
            ui.table_setup_column("Resource");
            ui.table_setup_column("Project");
            ui.table_setup_column("From");
            ui.table_setup_column("To");
            ui.table_setup_column("##actions");
            ui.table_headers_row();
            for assignment in rows {
                ui.table_next_row();
                ui.table_next_column();
                ui.text(assignment.resource_name.as_deref().unwrap_or("-"));
                ui.table_next_column();
                ui.text(assignment.project_name.as_deref().unwrap_or("-"));
                ui.table_next_column();
                ui.text(assignment.from_date.to_string());
                ui.table_next_column();
                ui.text(assignment.to_date.to_string());
                ui.table_next_column();
                if let Some(id) = assignment.id {
                    if ui.button(format!("Edit##assignment{}", id)) {
                        *nav = Some(Route::Section(Section::AssignmentForm(Some(id))));
                    }
                }
            }
        }
        draw_pager(ui, &mut self.view.page, pages);
        if self.view.is_loading() {
            ui.text_disabled("Loading...");
        }
    }
}

pub struct AssignmentForm {
    id: Option<AssignmentId>,
    load: Remote<Assignment>,
    submit: Remote<()>,
    resources: Remote<Vec<Resource>>,
    projects: Remote<Vec<Project>>,
    selected_resource: Option<ResourceId>,
    selected_project: Option<ProjectId>,
    from_date: String,
    to_date: String,
}

impl AssignmentForm {
    pub fn new() -> Self {
        AssignmentForm {
            id: None,
            load: Remote::new(),
            submit: Remote::new(),
            resources: Remote::new(),
            projects: Remote::new(),
            selected_resource: None,
            selected_project: None,
            from_date: String::new(),
            to_date: String::new(),
        }
    }

    pub fn enter(&mut self, id: Option<AssignmentId>, api: &ApiClient, token: &str) {
        *self = AssignmentForm::new();
        self.id = id;
        {
            let api = api.clone();
            let token = token.to_string();
            self.resources.start(move || api.resources(&token));
        }
        {
            let api = api.clone();
            let token = token.to_string();
            self.projects.start(move || api.projects(&token));
        }
        if let Some(id) = id {
            let api = api.clone();
            let token = token.to_string();
            self.load.start(move || api.assignment(&token, id));
        }
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        me: ResourceId,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        poll_options(&mut self.resources, "resources", toasts);
        poll_options(&mut self.projects, "projects", toasts);
        self.load.poll();
        if let Some(assignment) = self.load.take_ready() {
            self.selected_resource = Some(assignment.resource_id);
            self.selected_project = Some(assignment.project_id);
            self.from_date = assignment.from_date.to_string();
            self.to_date = assignment.to_date.to_string();
        }
        if let Some(err) = self.load.take_failed() {
            toasts.error(format!("Failed to load assignment: {}", err));
        }
        self.submit.poll();
        if self.submit.take_ready().is_some() {
            toasts.success("Assignment saved");
            *nav = Some(Route::Section(Section::Assignments));
        }
        if let Some(err) = self.submit.take_failed() {
            toasts.error(err.to_string());
        }

        ui.text(if self.id.is_some() {
            "Update Assignment"
        } else {
            "Assign Resource"
        });
        ui.separator();
        let resource_opts =
            resource_options(self.resources.value().map(Vec::as_slice).unwrap_or(&[]));
        let project_opts = project_options(self.projects.value().map(Vec::as_slice).unwrap_or(&[]));
        ui.set_next_item_width(280.0);
        if let Some(picked) = id_combo(
            ui,
            "Resource",
            &resource_opts,
            self.selected_resource,
            "Select a resource",
        ) {
            self.selected_resource = Some(picked);
        }
        ui.set_next_item_width(280.0);
        if let Some(picked) = id_combo(
            ui,
            "Project",
            &project_opts,
            self.selected_project,
            "Select a project",
        ) {
            self.selected_project = Some(picked);
        }
        ui.set_next_item_width(280.0);
        ui.input_text("From date", &mut self.from_date)
            .hint("YYYY-MM-DD")
            .build();
        ui.set_next_item_width(280.0);
        ui.input_text("To date", &mut self.to_date)
            .hint("YYYY-MM-DD")
            .build();

        ui.separator();
        let busy = self.submit.is_loading();
        let _disabled = ui.begin_disabled(busy);
        if ui.button("Save") {
            self.save(api, token, me, toasts);
        }
        ui.same_line();
        if ui.button("Cancel") {
            *nav = Some(Route::Section(Section::Assignments));
        }
    }

    fn save(&mut self, api: &ApiClient, token: &str, me: ResourceId, toasts: &mut Toasts) {
        let (resource_id, project_id) = match (self.selected_resource, self.selected_project) {
            (Some(resource_id), Some(project_id)) => (resource_id, project_id),
            _ => {
                toasts.error("A resource and a project must be selected");
                return;
            }
        };
        let (from_date, to_date) = match (parse_date(&self.from_date), parse_date(&self.to_date)) {
            (Some(from_date), Some(to_date)) => (from_date, to_date),
            _ => {
                toasts.error("From and to dates are required as YYYY-MM-DD");
                return;
            }
        };
        let assignment = Assignment {
            id: self.id,
            resource_id,
            resource_name: None,
            project_id,
            project_name: None,
            from_date,
            to_date,
            created_by: if self.id.is_none() { Some(me) } else { None },
            modified_by: Some(me),
        };
        let api = api.clone();
        let token = token.to_string();
        match self.id {
            Some(id) => self
                .submit
                .start(move || api.update_assignment(&token, id, &assignment)),
            None => self
                .submit
                .start(move || api.create_assignment(&token, &assignment)),
        }
    }
}
