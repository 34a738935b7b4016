use std::collections::{BTreeMap, BTreeSet};

use crate::client::ApiClient;
use crate::models::{FieldError, NewUser};
use crate::validation::{validate_form, FieldErrors};

/// A skill entry in the editor. `id` is a controller-assigned rendering key,
/// stable across removals; it carries no meaning outside list display and is
/// not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub id: u64,
    pub title: String,
}

/// Live field values for one form session. `age` uses 0 as the "unset"
/// sentinel; `current_skill` is the skill input's transient text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub password: String,
    pub repeat_password: String,
    pub email: String,
    pub website: String,
    pub age: u32,
    pub current_skill: String,
    pub skills: Vec<Skill>,
    pub accept_terms: bool,
}

impl RegistrationForm {
    pub fn age_or_unset(&self) -> Option<u32> {
        (self.age != 0).then_some(self.age)
    }

    /// Builds the wire payload: persisted fields only. Editing state
    /// (`current_skill`, `accept_terms`, skill ids) stays on the client.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            name: self.name.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            website: (!self.website.is_empty()).then(|| self.website.clone()),
            age: self.age_or_unset(),
            skills: self.skills.iter().map(|skill| skill.title.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
    Accepted,
    Rejected,
}

/// One-shot user-facing notification, consumed via [`FormController::take_notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Registered,
    ConnectionFailed,
    ServerFailed,
}

/// Resolution of one submission attempt, as interpreted from the raw
/// HTTP result.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    FieldRejected(FieldError),
    ServerError,
    ConnectionFailed,
}

impl SubmitOutcome {
    pub fn from_http(status: u16, body: Option<FieldError>) -> SubmitOutcome {
        match (status, body) {
            (200, _) => SubmitOutcome::Accepted,
            (400, Some(error)) => SubmitOutcome::FieldRejected(error),
            _ => SubmitOutcome::ServerError,
        }
    }

    /// Interprets the API client's untouched result. A 400 without a
    /// readable `{field, message}` body counts as a generic server failure.
    pub async fn classify(
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> SubmitOutcome {
        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = if status == 400 {
                    response.json::<FieldError>().await.ok()
                } else {
                    None
                };
                SubmitOutcome::from_http(status, body)
            }
            // No response reached us: transport failure.
            Err(_) => SubmitOutcome::ConnectionFailed,
        }
    }
}

const FORM_FIELDS: [&str; 8] = [
    "name",
    "password",
    "repeat_password",
    "email",
    "website",
    "age",
    "skills",
    "accept_terms",
];

fn field_key(name: &str) -> Option<&'static str> {
    FORM_FIELDS.iter().copied().find(|field| *field == name)
}

/// Owns the form values, touch tracking, validation errors, and the
/// submission lifecycle.
///
/// States: `Editing` (fields mutable, validation re-run on every change),
/// `Submitting` (every input locked until the in-flight request resolves),
/// and the resolution states `Accepted`/`Rejected` (inputs unlocked; the
/// next edit returns to `Editing`).
#[derive(Debug)]
pub struct FormController {
    values: RegistrationForm,
    touched: BTreeSet<&'static str>,
    errors: FieldErrors,
    state: FormState,
    notice: Option<Notice>,
    next_skill_id: u64,
}

impl Default for FormController {
    fn default() -> Self {
        FormController::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        let values = RegistrationForm::default();
        let errors = validate_form(&values);
        FormController {
            values,
            touched: BTreeSet::new(),
            errors,
            state: FormState::Editing,
            notice: None,
            next_skill_id: 1,
        }
    }

    pub fn values(&self) -> &RegistrationForm {
        &self.values
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// All current validation errors, touched or not.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Errors to surface: only those on fields the user has interacted with.
    pub fn visible_errors(&self) -> BTreeMap<&'static str, &str> {
        self.errors
            .iter()
            .filter(|(field, _)| self.touched.contains(*field))
            .map(|(field, message)| (*field, message.as_str()))
            .collect()
    }

    pub fn inputs_locked(&self) -> bool {
        self.state == FormState::Submitting
    }

    /// Marks a field as blurred so its error (if any) becomes visible.
    pub fn touch(&mut self, field: &'static str) {
        if let Some(field) = field_key(field) {
            self.touched.insert(field);
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut RegistrationForm)) {
        if self.inputs_locked() {
            return;
        }
        self.state = FormState::Editing;
        apply(&mut self.values);
        self.errors = validate_form(&self.values);
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|form| form.name = value);
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|form| form.password = value);
    }

    pub fn set_repeat_password(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|form| form.repeat_password = value);
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|form| form.email = value);
    }

    pub fn set_website(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|form| form.website = value);
    }

    pub fn set_age(&mut self, value: u32) {
        self.edit(|form| form.age = value);
    }

    pub fn set_current_skill(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|form| form.current_skill = value);
    }

    pub fn set_accept_terms(&mut self, value: bool) {
        self.edit(|form| form.accept_terms = value);
    }

    /// Appends the current skill text to the list and clears the input.
    /// Blank or whitespace-only input clears the input and leaves the list
    /// untouched. Returns whether an entry was added.
    pub fn add_skill(&mut self) -> bool {
        if self.inputs_locked() {
            return false;
        }
        self.state = FormState::Editing;
        if self.values.current_skill.trim().is_empty() {
            self.values.current_skill.clear();
            return false;
        }
        let title = std::mem::take(&mut self.values.current_skill);
        let id = self.next_skill_id;
        self.next_skill_id += 1;
        self.values.skills.push(Skill { id, title });
        self.errors = validate_form(&self.values);
        true
    }

    /// Removes the skill at `index`, preserving the order of the rest.
    /// Out-of-range indices are ignored.
    pub fn remove_skill(&mut self, index: usize) {
        if self.inputs_locked() || index >= self.values.skills.len() {
            return;
        }
        self.state = FormState::Editing;
        self.values.skills.remove(index);
        self.errors = validate_form(&self.values);
    }

    /// Attempts the `Editing -> Submitting` transition. Every field is
    /// marked touched so accumulated errors become visible; with any error
    /// present the submission is blocked.
    pub fn try_begin_submit(&mut self) -> bool {
        if self.inputs_locked() {
            return false;
        }
        self.touched.extend(FORM_FIELDS);
        self.errors = validate_form(&self.values);
        if !self.errors.is_empty() {
            self.state = FormState::Editing;
            return false;
        }
        self.state = FormState::Submitting;
        true
    }

    /// Resolves the in-flight submission. Releases the input lock on every
    /// branch.
    pub fn apply_outcome(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Accepted => {
                self.values = RegistrationForm::default();
                self.errors = validate_form(&self.values);
                self.touched.clear();
                self.notice = Some(Notice::Registered);
                self.state = FormState::Accepted;
            }
            SubmitOutcome::FieldRejected(error) => {
                self.state = FormState::Rejected;
                match field_key(&error.field) {
                    Some(field) => {
                        self.errors.insert(field, error.message);
                        self.touched.insert(field);
                    }
                    // A field we do not render: nothing to attach it to.
                    None => self.notice = Some(Notice::ServerFailed),
                }
            }
            SubmitOutcome::ServerError => {
                self.notice = Some(Notice::ServerFailed);
                self.state = FormState::Rejected;
            }
            SubmitOutcome::ConnectionFailed => {
                self.notice = Some(Notice::ConnectionFailed);
                self.state = FormState::Rejected;
            }
        }
    }

    /// Consumes the pending one-shot notification, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

/// Drives one full submission: validate and lock, send, classify, resolve.
/// No retry, no timeout; the lock guarantees a single in-flight request.
pub async fn submit(controller: &mut FormController, api: &ApiClient) -> FormState {
    if !controller.try_begin_submit() {
        return controller.state();
    }
    let payload = controller.values().to_new_user();
    let outcome = SubmitOutcome::classify(api.create_user(&payload).await).await;
    controller.apply_outcome(outcome);
    controller.state()
}

#[cfg(test)]
mod tests {
    use std::net::{SocketAddr, TcpListener};
    use std::sync::Arc;

    use actix_web::{web, App, HttpServer};

    use super::*;
    use crate::registry::{InMemoryStore, UserStore};
    use crate::routes;
    use crate::server::AppState;

    /// Runs the real service on an ephemeral port in its own system so the
    /// submit driver can be exercised over actual HTTP.
    fn spawn_service(registry: Arc<dyn UserStore>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            actix_rt::System::new().block_on(async move {
                HttpServer::new(move || {
                    App::new()
                        .app_data(web::Data::new(AppState {
                            registry: registry.clone(),
                        }))
                        .configure(routes::init)
                })
                .workers(1)
                .listen(listener)
                .unwrap()
                .run()
                .await
            })
        });
        addr
    }

    fn filled_controller() -> FormController {
        let mut controller = FormController::new();
        controller.set_name("Alice");
        controller.set_password("Passw0rd");
        controller.set_repeat_password("Passw0rd");
        controller.set_email("alice@example.com");
        controller.set_accept_terms(true);
        controller
    }

    fn skill_titles(controller: &FormController) -> Vec<&str> {
        controller
            .values()
            .skills
            .iter()
            .map(|skill| skill.title.as_str())
            .collect()
    }

    #[test]
    fn blank_skill_input_is_a_list_noop_that_clears_the_input() {
        let mut controller = FormController::new();
        controller.set_current_skill("   ");
        assert!(!controller.add_skill());
        assert!(controller.values().skills.is_empty());
        assert_eq!(controller.values().current_skill, "");
    }

    #[test]
    fn adding_a_skill_appends_and_clears_the_input() {
        let mut controller = FormController::new();
        controller.set_current_skill("Go");
        assert!(controller.add_skill());
        assert_eq!(skill_titles(&controller), vec!["Go"]);
        assert_eq!(controller.values().current_skill, "");
    }

    #[test]
    fn removing_a_skill_preserves_the_order_of_the_rest() {
        let mut controller = FormController::new();
        for title in ["Go", "Rust", "SQL"] {
            controller.set_current_skill(title);
            controller.add_skill();
        }
        controller.remove_skill(0);
        assert_eq!(skill_titles(&controller), vec!["Rust", "SQL"]);
    }

    #[test]
    fn out_of_range_removal_is_a_noop() {
        let mut controller = FormController::new();
        controller.set_current_skill("Go");
        controller.add_skill();
        controller.remove_skill(5);
        assert_eq!(skill_titles(&controller), vec!["Go"]);
    }

    #[test]
    fn skill_ids_stay_unique_across_removals() {
        let mut controller = FormController::new();
        for title in ["Go", "Rust"] {
            controller.set_current_skill(title);
            controller.add_skill();
        }
        let rust_id = controller.values().skills[1].id;
        controller.remove_skill(0);
        controller.set_current_skill("SQL");
        controller.add_skill();
        let ids: Vec<u64> = controller.values().skills.iter().map(|s| s.id).collect();
        assert_eq!(ids[0], rust_id);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn errors_are_hidden_until_the_field_is_touched() {
        let mut controller = FormController::new();
        controller.set_email("not-an-email");
        assert!(controller.errors().contains_key("email"));
        assert!(controller.visible_errors().is_empty());
        controller.touch("email");
        assert!(controller.visible_errors().contains_key("email"));
    }

    #[test]
    fn submit_is_blocked_while_the_form_is_invalid() {
        let mut controller = FormController::new();
        assert!(!controller.try_begin_submit());
        assert_eq!(controller.state(), FormState::Editing);
        // the blocked attempt touches everything, surfacing all errors
        assert!(controller.visible_errors().contains_key("name"));
        assert!(controller.visible_errors().contains_key("accept_terms"));
    }

    #[test]
    fn unaccepted_terms_block_an_otherwise_valid_form() {
        let mut controller = filled_controller();
        controller.set_accept_terms(false);
        assert!(!controller.try_begin_submit());
        assert!(controller.visible_errors().contains_key("accept_terms"));
    }

    #[test]
    fn submitting_locks_every_input() {
        let mut controller = filled_controller();
        assert!(controller.try_begin_submit());
        assert_eq!(controller.state(), FormState::Submitting);
        assert!(controller.inputs_locked());

        controller.set_name("Mallory");
        controller.set_current_skill("Go");
        assert!(!controller.add_skill());
        controller.remove_skill(0);
        assert_eq!(controller.values().name, "Alice");
        assert!(controller.values().skills.is_empty());

        // and a second submit attempt is rejected while one is in flight
        assert!(!controller.try_begin_submit());
    }

    #[test]
    fn acceptance_resets_the_form_and_notifies_once() {
        let mut controller = filled_controller();
        assert!(controller.try_begin_submit());
        controller.apply_outcome(SubmitOutcome::Accepted);

        assert_eq!(controller.state(), FormState::Accepted);
        assert!(!controller.inputs_locked());
        assert_eq!(*controller.values(), RegistrationForm::default());
        assert!(controller.visible_errors().is_empty());
        assert_eq!(controller.take_notice(), Some(Notice::Registered));
        assert_eq!(controller.take_notice(), None);

        controller.set_name("Bob");
        assert_eq!(controller.state(), FormState::Editing);
    }

    #[test]
    fn field_rejection_maps_the_server_message_onto_the_form() {
        let mut controller = filled_controller();
        assert!(controller.try_begin_submit());
        controller.apply_outcome(SubmitOutcome::FieldRejected(FieldError {
            field: "email".to_string(),
            message: "email is already registered".to_string(),
        }));

        assert_eq!(controller.state(), FormState::Rejected);
        assert!(!controller.inputs_locked());
        assert_eq!(
            controller.visible_errors().get("email"),
            Some(&"email is already registered")
        );
        // values survive for correction and resubmission
        assert_eq!(controller.values().email, "alice@example.com");
        assert_eq!(controller.take_notice(), None);
    }

    #[test]
    fn server_failure_preserves_values_and_raises_a_generic_notice() {
        let mut controller = filled_controller();
        let before = controller.values().clone();
        assert!(controller.try_begin_submit());
        controller.apply_outcome(SubmitOutcome::ServerError);

        assert_eq!(controller.state(), FormState::Rejected);
        assert_eq!(*controller.values(), before);
        assert_eq!(controller.take_notice(), Some(Notice::ServerFailed));
    }

    #[test]
    fn transport_failure_alters_no_field() {
        let mut controller = filled_controller();
        let before = controller.values().clone();
        assert!(controller.try_begin_submit());
        controller.apply_outcome(SubmitOutcome::ConnectionFailed);

        assert_eq!(controller.state(), FormState::Rejected);
        assert_eq!(*controller.values(), before);
        assert!(controller.errors().is_empty());
        assert_eq!(controller.take_notice(), Some(Notice::ConnectionFailed));
    }

    #[test]
    fn http_results_classify_per_the_wire_contract() {
        let duplicate = FieldError {
            field: "email".to_string(),
            message: "taken".to_string(),
        };
        assert_eq!(
            SubmitOutcome::from_http(200, None),
            SubmitOutcome::Accepted
        );
        assert_eq!(
            SubmitOutcome::from_http(400, Some(duplicate.clone())),
            SubmitOutcome::FieldRejected(duplicate)
        );
        assert_eq!(
            SubmitOutcome::from_http(400, None),
            SubmitOutcome::ServerError
        );
        assert_eq!(
            SubmitOutcome::from_http(500, None),
            SubmitOutcome::ServerError
        );
        assert_eq!(
            SubmitOutcome::from_http(418, None),
            SubmitOutcome::ServerError
        );
    }

    #[test]
    fn the_wire_payload_carries_persisted_fields_only() {
        let mut controller = filled_controller();
        controller.set_website("https://alice.example.com");
        controller.set_age(30);
        controller.set_current_skill("Go");
        controller.add_skill();
        controller.set_current_skill("half-typed");

        let payload = controller.values().to_new_user();
        assert_eq!(payload.name, "Alice");
        assert_eq!(payload.website.as_deref(), Some("https://alice.example.com"));
        assert_eq!(payload.age, Some(30));
        assert_eq!(payload.skills, vec!["Go".to_string()]);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("current_skill").is_none());
        assert!(json.get("accept_terms").is_none());
        assert!(json.get("repeat_password").is_none());
    }

    #[actix_rt::test]
    async fn submit_drives_a_full_round_trip_against_the_service() {
        let registry: Arc<dyn UserStore> = Arc::new(InMemoryStore::default());
        let addr = spawn_service(registry.clone());
        let api = ApiClient::new(&format!("http://{}", addr));

        let mut controller = filled_controller();
        assert_eq!(submit(&mut controller, &api).await, FormState::Accepted);
        assert_eq!(controller.take_notice(), Some(Notice::Registered));
        assert_eq!(*controller.values(), RegistrationForm::default());
        assert_eq!(registry.all().await.len(), 1);

        // refill and resubmit the same email: the rejection lands on the field
        let mut controller = filled_controller();
        assert_eq!(submit(&mut controller, &api).await, FormState::Rejected);
        assert!(!controller.inputs_locked());
        assert_eq!(
            controller.visible_errors().get("email"),
            Some(&"email is already registered")
        );
        assert_eq!(controller.take_notice(), None);
        assert_eq!(registry.all().await.len(), 1);
    }

    #[actix_rt::test]
    async fn submit_with_an_invalid_form_never_touches_the_wire() {
        // nothing listens here; a request attempt would surface as a
        // connectivity notice
        let api = ApiClient::new("http://127.0.0.1:9");
        let mut controller = FormController::new();
        assert_eq!(submit(&mut controller, &api).await, FormState::Editing);
        assert_eq!(controller.take_notice(), None);
        assert!(controller.visible_errors().contains_key("name"));
    }

    #[actix_rt::test]
    async fn submit_reports_a_connectivity_failure_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::new(&format!("http://{}", addr));
        let mut controller = filled_controller();
        let before = controller.values().clone();
        assert_eq!(submit(&mut controller, &api).await, FormState::Rejected);
        assert_eq!(controller.take_notice(), Some(Notice::ConnectionFailed));
        assert_eq!(*controller.values(), before);
    }

    #[test]
    fn unset_optionals_serialize_as_null_not_sentinels() {
        let controller = filled_controller();
        let payload = controller.values().to_new_user();
        assert_eq!(payload.website, None);
        assert_eq!(payload.age, None);
    }
}
