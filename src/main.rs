use anyhow::{anyhow, Result};
use async_trait::async_trait;
use derive_more::Display;
use dotenv::dotenv;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use log::info;
use std::fmt;
use std::sync::{Arc, Mutex};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use healthcard::api::{HttpTransport, ListQuery};
use healthcard::authorization::{navigate, Navigation, Route, LANDING_PATH, LOGIN_PATH, REGISTER_PATH};
use healthcard::config::Config;
use healthcard::forms::{Control, Form, FormError};
use healthcard::models::{display_date, Appointment, AppointmentStatus, Party, Role, User};
use healthcard::notify::ConsoleNotifier;
use healthcard::pages::appointments::{AppointmentAction, AppointmentsBoard};
use healthcard::pages::auth::{LoginPage, RegisterPage};
use healthcard::pages::dashboard::{AdminStats, MemberDashboard};
use healthcard::pages::history::{vitals_summary, MedicalHistory, NO_RECORDS};
use healthcard::pages::menu::{active_item, menu_for};
use healthcard::pages::prescriptions::PrescriptionsPage;
use healthcard::pages::profile::ProfilePage;
use healthcard::pages::users::UserList;
use healthcard::pages::{PageError, Services};
use healthcard::selector::{Selector, SelectorBody, LOADING_MESSAGE};
use healthcard::storage::Storage;

type MenuExit = Option<()>;
const MENU_EXIT: MenuExit = None;
const MENU_LOOP: MenuExit = Some(());

/// A text menu. `enter` returns `None` to leave, `Some(())` to show the
/// menu again.
#[async_trait(?Send)]
trait Menu {
    async fn enter(&mut self) -> Result<MenuExit>;

    /// Runs the menu until it asks to leave, printing errors on the way.
    async fn enter_loop(&mut self) {
        while let Some(result) = self.enter().await.transpose() {
            if let Err(error) = result {
                eprintln!("Error: {error}");
            }
        }
    }
}

/// A choice shown by its label.
struct Labeled<T>(String, T);

impl<T> fmt::Display for Labeled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prompts every visible field in order. Visibility is re-evaluated after
/// each answer, so fields revealed by a choice are asked right away.
fn fill(form: &mut Form) -> Result<()> {
    let mut index = 0;
    while let Some(field) = form.render().into_iter().nth(index) {
        index += 1;
        let answer = match field.control {
            Control::Input {
                input_type: "password",
                ..
            } => Password::new(&field.label)
                .without_confirmation()
                .with_display_mode(PasswordDisplayMode::Masked)
                .prompt()?,
            Control::Input {
                value, placeholder, ..
            } => {
                let mut prompt = Text::new(&field.label).with_initial_value(&value);
                if let Some(placeholder) = &placeholder {
                    prompt = prompt.with_placeholder(placeholder);
                }
                prompt.prompt()?
            }
            Control::Select { options, selected } => {
                let cursor = options
                    .iter()
                    .position(|option| option.value == selected)
                    .unwrap_or(0);
                Select::new(&field.label, options)
                    .with_starting_cursor(cursor)
                    .prompt()?
                    .value
            }
            Control::Locked { display, .. } => {
                println!("{}: {display}", field.label);
                continue;
            }
            Control::Hidden { .. } => continue,
        };
        form.set(&field.name, &answer)?;
    }
    Ok(())
}

/// Shows why a submission failed and asks whether to go again. API failures
/// were already notified.
fn try_again(error: PageError, form: &Form) -> Result<bool> {
    match error {
        PageError::Form(FormError::Validation(_)) => {
            for field in form.render() {
                if let Some(message) = field.error {
                    eprintln!("  {}: {message}", field.label);
                }
            }
        }
        PageError::Api(_) | PageError::Session(_) => {}
        other => eprintln!("Error: {other}"),
    }
    Ok(Confirm::new("Try again?").with_default(true).prompt()?)
}

/// `on_select` callback writing into a shared slot.
fn capture() -> (Arc<Mutex<Option<String>>>, impl FnOnce(String) + Send + 'static) {
    let slot = Arc::new(Mutex::new(None::<String>));
    let writer = slot.clone();
    let on_select = move |id: String| {
        if let Ok(mut picked) = writer.lock() {
            *picked = Some(id);
        }
    };
    (slot, on_select)
}

/// Runs a selector dialog: search, then pick. Returns what `on_select` got.
async fn choose(
    mut selector: Selector,
    services: &Services,
    picked: &Mutex<Option<String>>,
) -> Result<Option<String>> {
    println!("{LOADING_MESSAGE}");
    selector.load(&services.users).await;

    let search = Text::new(&format!("Search {}s by name:", selector.role()))
        .prompt_skippable()?
        .unwrap_or_default();
    selector.set_search(&search);

    let candidates: Vec<Labeled<String>> = match selector.body() {
        SelectorBody::Candidates(users) => users
            .iter()
            .map(|user| Labeled(describe(user), user.id.clone()))
            .collect(),
        SelectorBody::Empty(message) => {
            println!("{message}");
            Vec::new()
        }
        SelectorBody::Loading => Vec::new(),
    };
    if candidates.is_empty() {
        selector.close();
        return Ok(None);
    }

    match Select::new("Choose:", candidates).prompt_skippable()? {
        Some(choice) => selector.select(&choice.1)?,
        None => selector.close(),
    }
    Ok(picked
        .lock()
        .map_err(|_| anyhow!("Selection was lost"))?
        .take())
}

fn describe(user: &User) -> String {
    match &user.specialization {
        Some(specialization) => format!("{} <{}> - {specialization}", user.full_name, user.email),
        None => format!("{} <{}>", user.full_name, user.email),
    }
}

fn party_name(party: &Option<Party>) -> &str {
    party.as_ref().and_then(Party::full_name).unwrap_or("Unknown")
}

struct Portal {
    services: Services,
    location: String,
    /// Where the visitor was sent away from before signing in.
    from: Option<String>,
}

impl Portal {
    fn new(services: Services) -> Self {
        Self {
            services,
            location: LANDING_PATH.to_string(),
            from: None,
        }
    }

    async fn start(&mut self) -> Result<()> {
        println!("Welcome to HealthCard, your patient portal.");
        self.enter_loop().await;
        Ok(())
    }

    fn landing(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[display("Sign in")]
            Login,
            #[display("Create an account")]
            Register,
            #[display("Quit")]
            Exit,
        }

        match Select::new("What do you want to do?", Choice::iter().collect()).prompt()? {
            Choice::Login => self.location = LOGIN_PATH.to_string(),
            Choice::Register => self.location = REGISTER_PATH.to_string(),
            Choice::Exit => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }

    async fn login(&mut self) -> Result<MenuExit> {
        let mut page = LoginPage::open(&self.services, self.from.take())?;
        self.location = LANDING_PATH.to_string();
        loop {
            fill(page.form_mut())?;
            match page.submit(&self.services).await {
                Ok(next) => {
                    self.location = next;
                    break;
                }
                Err(e) => {
                    if !try_again(e, page.form())? {
                        break;
                    }
                }
            }
        }
        Ok(MENU_LOOP)
    }

    async fn register(&mut self) -> Result<MenuExit> {
        let mut page = RegisterPage::open()?;
        self.location = LANDING_PATH.to_string();
        loop {
            fill(page.form_mut())?;
            match page.submit(&self.services).await {
                Ok(next) => {
                    self.location = next;
                    break;
                }
                Err(e) => {
                    if !try_again(e, page.form())? {
                        break;
                    }
                }
            }
        }
        Ok(MENU_LOOP)
    }

    async fn screen(&mut self, route: Route) -> Result<MenuExit> {
        let user = self.services.current_user()?;
        let heading = match &route {
            Route::Profile(_) => "My Profile",
            Route::PatientDoctor(_) => "Doctor",
            _ => active_item(user.role, &self.location)
                .map(|item| item.label)
                .unwrap_or("HealthCard"),
        };
        println!("\n== {heading} ==");

        match render(&self.services, route).await {
            Ok(Some(next)) => {
                self.location = next;
                return Ok(MENU_LOOP);
            }
            Ok(None) => {}
            Err(e) => eprintln!("Error: {e}"),
        }
        self.navigation(&user)
    }

    fn navigation(&mut self, user: &User) -> Result<MenuExit> {
        enum Destination {
            Go(String),
            SignOut,
            Quit,
        }

        let mut choices: Vec<Labeled<Destination>> = menu_for(user.role)
            .iter()
            .map(|item| Labeled(item.label.to_string(), Destination::Go(item.path.to_string())))
            .collect();
        choices.push(Labeled(
            "My Profile".to_string(),
            Destination::Go(Route::Profile(user.role).path()),
        ));
        choices.push(Labeled("Sign out".to_string(), Destination::SignOut));
        choices.push(Labeled("Quit".to_string(), Destination::Quit));

        match Select::new("Go to:", choices).prompt()?.1 {
            Destination::Go(path) => self.location = path,
            Destination::SignOut => {
                // A failed logout is already notified and leaves the session in place
                if self.services.session.logout().is_ok() {
                    self.location = LOGIN_PATH.to_string();
                }
            }
            Destination::Quit => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

#[async_trait(?Send)]
impl Menu for Portal {
    async fn enter(&mut self) -> Result<MenuExit> {
        let route = match navigate(&self.services.session.snapshot(), &self.location) {
            Navigation::Render(route) => route,
            Navigation::Redirect { to, from } => {
                info!("Redirected from {} to {to}", self.location);
                if from.is_some() {
                    self.from = from;
                }
                self.location = to;
                return Ok(MENU_LOOP);
            }
        };

        match route {
            Route::Landing => self.landing(),
            Route::Login => self.login().await,
            Route::Register => self.register().await,
            route => self.screen(route).await,
        }
    }
}

/// Shows one protected screen. Returns a location when the screen itself
/// decides where to go next.
async fn render(services: &Services, route: Route) -> Result<Option<String>> {
    match route {
        Route::AdminDashboard | Route::AdminAnalytics => show_stats(services).await?,
        Route::DoctorDashboard | Route::PatientDashboard => show_recent(services).await?,
        Route::AdminUsers | Route::DoctorPatients => {
            UsersMenu {
                page: UserList::open(services).await?,
            }
            .enter_loop()
            .await
        }
        Route::DoctorAppointments | Route::PatientAppointments => {
            AppointmentsMenu {
                services: services.clone(),
                board: AppointmentsBoard::open(services).await?,
            }
            .enter_loop()
            .await
        }
        Route::DoctorRecords | Route::PatientHistory => {
            HistoryMenu {
                services: services.clone(),
                page: MedicalHistory::open(services).await?,
            }
            .enter_loop()
            .await
        }
        Route::DoctorPrescriptions | Route::PatientMedications => {
            PrescriptionsMenu {
                services: services.clone(),
                page: PrescriptionsPage::open(services).await?,
            }
            .enter_loop()
            .await
        }
        Route::PatientDoctors => return browse_doctors(services).await,
        Route::PatientDoctor(id) => show_doctor(services, &id).await?,
        Route::Profile(_) => edit_profile(services).await?,
        Route::Landing | Route::Login | Route::Register => {}
    }
    Ok(None)
}

async fn show_stats(services: &Services) -> Result<()> {
    let stats = AdminStats::load(services).await?;
    for (label, value) in stats.cards() {
        println!("  {label:<14}{value}");
    }
    Ok(())
}

fn appointment_line(board: &AppointmentsBoard, appointment: &Appointment) -> String {
    format!(
        "{} {}  {}  {}  [{}]",
        appointment.display_date(),
        appointment.appointment_time,
        board.counterpart_label(appointment),
        AppointmentsBoard::reason_label(appointment),
        appointment.status
    )
}

async fn show_recent(services: &Services) -> Result<()> {
    let dashboard = MemberDashboard::load(services).await?;
    println!("{}", dashboard.greeting());
    if dashboard.recent.is_empty() {
        println!("No upcoming appointments.");
    }
    for appointment in &dashboard.recent {
        println!(
            "  {} {}  [{}]",
            appointment.display_date(),
            appointment.appointment_time,
            appointment.status
        );
    }
    Ok(())
}

async fn browse_doctors(services: &Services) -> Result<Option<String>> {
    let doctors = services.users.list(&ListQuery::role(Role::Doctor)).await?.users;
    if doctors.is_empty() {
        println!("No doctors found.");
        return Ok(None);
    }

    let choices: Vec<Labeled<String>> = doctors
        .iter()
        .map(|doctor| Labeled(describe(doctor), doctor.id.clone()))
        .collect();
    Ok(Select::new("See the details of:", choices)
        .prompt_skippable()?
        .map(|choice| Route::PatientDoctor(choice.1).path()))
}

async fn show_doctor(services: &Services, id: &str) -> Result<()> {
    let doctor = services.users.get(id).await?;
    println!("Dr. {}\n{}", doctor.full_name, doctor.email);
    let details = [
        ("Phone", &doctor.phone),
        ("Specialization", &doctor.specialization),
        ("Experience (years)", &doctor.years_of_experience),
        ("About", &doctor.bio),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    Ok(())
}

async fn edit_profile(services: &Services) -> Result<()> {
    let mut page = ProfilePage::open(services)?;
    let user = page.user();
    println!("{}\n{}\nRole: {}", user.full_name, user.email, user.role.label());

    if !Confirm::new("Edit your profile?").with_default(false).prompt()? {
        return Ok(());
    }
    loop {
        fill(page.form_mut())?;
        match page.save().await {
            Ok(_) => return Ok(()),
            Err(e) => {
                if !try_again(e, page.form())? {
                    return Ok(());
                }
            }
        }
    }
}

struct UsersMenu {
    page: UserList,
}

#[async_trait(?Send)]
impl Menu for UsersMenu {
    async fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[display("Search by name")]
            Search,
            #[display("Delete a user")]
            Delete,
            #[display("Back")]
            Back,
        }

        for user in self.page.filtered() {
            println!("  {} ({})", describe(user), user.role.label());
        }

        match Select::new("Users", Choice::iter().collect()).prompt()? {
            Choice::Search => {
                let search = Text::new("Name contains:")
                    .with_initial_value(self.page.search())
                    .prompt()?;
                self.page.set_search(&search);
            }
            Choice::Delete => {
                let candidates: Vec<Labeled<String>> = self
                    .page
                    .filtered()
                    .into_iter()
                    .filter(|user| self.page.can_delete(user))
                    .map(|user| Labeled(describe(user), user.id.clone()))
                    .collect();
                if candidates.is_empty() {
                    println!("Nothing you can delete here.");
                    return Ok(MENU_LOOP);
                }
                let Some(choice) = Select::new("Delete:", candidates).prompt_skippable()? else {
                    return Ok(MENU_LOOP);
                };

                let target = self.page.request_delete(&choice.1)?;
                let question = format!("Delete {} ? This cannot be undone.", target.full_name);
                if Confirm::new(&question).with_default(false).prompt()? {
                    self.page.confirm_delete().await?;
                } else {
                    self.page.cancel_delete();
                }
            }
            Choice::Back => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

struct AppointmentsMenu {
    services: Services,
    board: AppointmentsBoard,
}

impl AppointmentsMenu {
    async fn open(&mut self, id: &str) -> Result<()> {
        enum Step {
            Edit,
            Accept,
            Cancel,
        }

        let Some(appointment) = self.board.appointments().iter().find(|a| a.id == id) else {
            return Ok(());
        };
        let mut steps = Vec::new();
        match self.board.action_for(appointment) {
            AppointmentAction::Edit => steps.push(Labeled("Edit".to_string(), Step::Edit)),
            AppointmentAction::Accept => steps.push(Labeled("Accept".to_string(), Step::Accept)),
            AppointmentAction::Nothing => {}
        }
        if self.board.can_cancel(appointment) {
            steps.push(Labeled("Cancel appointment".to_string(), Step::Cancel));
        }
        if steps.is_empty() {
            println!("Nothing to do with this appointment.");
            return Ok(());
        }

        let Some(step) = Select::new("Action:", steps).prompt_skippable()? else {
            return Ok(());
        };
        match step.1 {
            Step::Edit => {
                self.board.start_edit(id)?;
                self.edit().await?;
            }
            Step::Accept => {
                if Confirm::new("Accept this appointment?").with_default(true).prompt()? {
                    self.board.accept(id).await?;
                }
            }
            Step::Cancel => {
                if Confirm::new("Cancel this appointment?").with_default(false).prompt()? {
                    self.board.cancel(id).await?;
                }
            }
        }
        Ok(())
    }

    async fn edit(&mut self) -> Result<()> {
        loop {
            let Some(form) = self.board.editor_form_mut() else {
                return Ok(());
            };
            fill(form)?;
            match self.board.submit_editor().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let again = match self.board.editor() {
                        Some((_, form)) => try_again(e, form)?,
                        None => false,
                    };
                    if !again {
                        self.board.close_editor();
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl Menu for AppointmentsMenu {
    async fn enter(&mut self) -> Result<MenuExit> {
        #[derive(Display)]
        enum Choice {
            #[display("Open an appointment")]
            Open,
            #[display("Filter by status")]
            Filter,
            #[display("Show more")]
            More,
            #[display("Book an appointment")]
            New,
            #[display("Back")]
            Back,
        }

        let lines: Vec<Labeled<String>> = self
            .board
            .visible()
            .into_iter()
            .map(|appointment| Labeled(appointment_line(&self.board, appointment), appointment.id.clone()))
            .collect();
        if lines.is_empty() {
            println!("No appointments found.");
        }
        for line in &lines {
            println!("  {line}");
        }

        let mut choices = Vec::new();
        if !lines.is_empty() {
            choices.push(Choice::Open);
        }
        choices.push(Choice::Filter);
        if self.board.has_more() {
            choices.push(Choice::More);
        }
        if self.board.can_create() {
            choices.push(Choice::New);
        }
        choices.push(Choice::Back);

        match Select::new("Appointments", choices).prompt()? {
            Choice::Open => {
                let Some(choice) = Select::new("Which one?", lines).prompt_skippable()? else {
                    return Ok(MENU_LOOP);
                };
                self.open(&choice.1).await?;
            }
            Choice::Filter => {
                let mut options = vec![Labeled("All".to_string(), None)];
                options.extend(
                    AppointmentStatus::iter().map(|status| Labeled(status.to_string(), Some(status))),
                );
                let choice = Select::new("Status:", options).prompt()?;
                self.board.set_filter(choice.1);
            }
            Choice::More => self.board.show_more(),
            Choice::New => {
                let (picked, on_select) = capture();
                let selector = self.board.doctor_selector(on_select, || {})?;
                if let Some(doctor_id) = choose(selector, &self.services, &picked).await? {
                    self.board.start_new(&doctor_id)?;
                    self.edit().await?;
                }
            }
            Choice::Back => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

struct HistoryMenu {
    services: Services,
    page: MedicalHistory,
}

#[async_trait(?Send)]
impl Menu for HistoryMenu {
    async fn enter(&mut self) -> Result<MenuExit> {
        if self.page.records().is_empty() {
            println!("{NO_RECORDS}");
        }
        for record in self.page.records() {
            println!(
                "  {}  Dr. {} / {}\n    Diagnosis: {}\n    Treatment: {}\n    {}",
                display_date(&record.visit_date),
                party_name(&record.doctor_id),
                party_name(&record.patient_id),
                record.diagnosis,
                record.treatment,
                vitals_summary(record.vital_signs.as_ref())
            );
        }

        let mut choices = Vec::new();
        if self.page.can_add() {
            choices.push(Labeled("Add a record".to_string(), true));
        }
        choices.push(Labeled("Back".to_string(), false));
        if !Select::new("Medical records", choices).prompt()?.1 {
            return Ok(MENU_EXIT);
        }

        let (picked, on_select) = capture();
        let selector = self.page.patient_selector(on_select, || {})?;
        let Some(patient_id) = choose(selector, &self.services, &picked).await? else {
            return Ok(MENU_LOOP);
        };
        self.page.start_add(&patient_id)?;
        loop {
            let Some(form) = self.page.editor_mut() else {
                break;
            };
            fill(form)?;
            match self.page.submit_record().await {
                Ok(()) => break,
                Err(e) => {
                    let again = match self.page.editor_mut() {
                        Some(form) => try_again(e, form)?,
                        None => false,
                    };
                    if !again {
                        self.page.close_editor();
                        break;
                    }
                }
            }
        }
        Ok(MENU_LOOP)
    }
}

struct PrescriptionsMenu {
    services: Services,
    page: PrescriptionsPage,
}

impl PrescriptionsMenu {
    fn pick(&self, prompt: &str) -> Result<Option<String>> {
        let choices: Vec<Labeled<String>> = self
            .page
            .prescriptions()
            .iter()
            .map(|p| Labeled(format!("{} {}", p.medication_name, p.dosage), p.id.clone()))
            .collect();
        Ok(Select::new(prompt, choices)
            .prompt_skippable()?
            .map(|choice| choice.1))
    }

    async fn edit(&mut self) -> Result<()> {
        loop {
            let Some(form) = self.page.editor_form_mut() else {
                return Ok(());
            };
            fill(form)?;
            match self.page.submit_editor().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let again = match self.page.editor() {
                        Some((_, form)) => try_again(e, form)?,
                        None => false,
                    };
                    if !again {
                        self.page.close_editor();
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl Menu for PrescriptionsMenu {
    async fn enter(&mut self) -> Result<MenuExit> {
        #[derive(Display)]
        enum Choice {
            #[display("New prescription")]
            New,
            #[display("Edit a prescription")]
            Edit,
            #[display("Delete a prescription")]
            Delete,
            #[display("Export a prescription")]
            Export,
            #[display("Back")]
            Back,
        }

        let prescriptions = self.page.prescriptions();
        if prescriptions.is_empty() {
            println!("No prescriptions found.");
        }
        for p in prescriptions {
            println!(
                "  {} {}, {} for {} (patient: {}, doctor: {})",
                p.medication_name,
                p.dosage,
                p.frequency,
                p.duration,
                party_name(&p.patient_id),
                party_name(&p.doctor_id)
            );
        }

        let mut choices = Vec::new();
        if self.page.can_manage() {
            choices.push(Choice::New);
            if !prescriptions.is_empty() {
                choices.extend([Choice::Edit, Choice::Delete]);
            }
        }
        if self.page.can_export() && !prescriptions.is_empty() {
            choices.push(Choice::Export);
        }
        choices.push(Choice::Back);

        match Select::new("Prescriptions", choices).prompt()? {
            Choice::New => {
                let (picked, on_select) = capture();
                let selector = self.page.patient_selector(on_select, || {})?;
                if let Some(patient_id) = choose(selector, &self.services, &picked).await? {
                    self.page.start_create(&patient_id)?;
                    self.edit().await?;
                }
            }
            Choice::Edit => {
                if let Some(id) = self.pick("Edit:")? {
                    self.page.start_edit(&id)?;
                    self.edit().await?;
                }
            }
            Choice::Delete => {
                if let Some(id) = self.pick("Delete:")? {
                    if Confirm::new("Delete this prescription?").with_default(false).prompt()? {
                        self.page.delete(&id).await?;
                    }
                }
            }
            Choice::Export => {
                if let Some(id) = self.pick("Export:")? {
                    println!("\n{}\n", self.page.export(&id)?);
                }
            }
            Choice::Back => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::from_env();
    simple_logging::log_to_file(&config.log_file, config.log_level)?;

    let storage = Arc::new(Storage::open(config.session_file.clone())?);
    let transport = Arc::new(HttpTransport::new(&config.api_url, config.timeout_secs)?);
    let services = Services::new(transport, storage, Arc::new(ConsoleNotifier));
    services.session.initialize();
    info!("HealthCard client started against {}", config.api_url);

    Portal::new(services).start().await
}
