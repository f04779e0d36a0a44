//! MockSet: ordered, name-indexed aggregate of response specs.
//!
//! A `MockSet` is built once per test from the declared specs, registers
//! every grouped descriptor against an interception backend, and is
//! read-only afterwards. Test bodies look specs up by endpoint name or
//! position and iterate in declaration order.

use crate::mocks::backend::{
    BackendError, DispatchError, InterceptBackend, MockResponse, RecordedRequest,
};
use crate::types::method::HttpMethod;
use crate::types::registration::group_by_endpoint;
use crate::types::spec::ResponseSpec;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// Errors constructing a [`MockSet`]
#[derive(Debug)]
pub enum RegisterError {
    /// Two specs resolve to the same endpoint name
    DuplicateName { name: String },
    /// The backend rejected a registration
    Backend(BackendError),
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::DuplicateName { name } => {
                write!(f, "Duplicate endpoint name: {}", name)
            }
            RegisterError::Backend(e) => write!(f, "Backend registration failed: {}", e),
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegisterError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BackendError> for RegisterError {
    fn from(err: BackendError) -> Self {
        RegisterError::Backend(err)
    }
}

/// Lookup failure, carrying the registered names for diagnosability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    /// The name that was asked for
    pub name: String,
    /// Every registered endpoint name, sorted
    pub known: Vec<String>,
}

impl LookupError {
    /// The registered name closest to the one asked for, if any is close
    /// enough to be a plausible typo.
    pub fn suggestion(&self) -> Option<&str> {
        self.known
            .iter()
            .map(|known| (edit_distance(&self.name, known), known))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, known)| known.as_str())
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown endpoint name: '{}'.", self.name)?;
        if let Some(suggestion) = self.suggestion() {
            write!(f, " Did you mean '{}'?", suggestion)?;
        }
        if self.known.is_empty() {
            write!(f, " No endpoints are registered.")
        } else {
            write!(f, " Registered endpoints: {}", self.known.join(", "))
        }
    }
}

impl std::error::Error for LookupError {}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current.push(substitution.min(previous[j + 1] + 1).min(current[j] + 1));
        }
        previous = current;
    }

    previous[b.len()]
}

/// Ordered, name-indexed collection of registered response specs.
///
/// Construction registers every spec with the backend; afterwards the set
/// only answers queries. The name index and the ordered sequence always
/// hold the same entries.
pub struct MockSet {
    specs: Vec<ResponseSpec>,
    index: HashMap<String, usize>,
    backend: Option<Box<dyn InterceptBackend>>,
}

impl MockSet {
    /// Index the specs and register each grouped descriptor with the
    /// backend.
    ///
    /// Duplicate names fail before anything reaches the backend; backend
    /// rejections propagate verbatim.
    pub fn register(
        specs: Vec<ResponseSpec>,
        backend: impl InterceptBackend + 'static,
    ) -> Result<Self, RegisterError> {
        let index = Self::build_index(&specs)?;

        let mut backend = backend;
        for descriptor in group_by_endpoint(&specs) {
            backend.register(&descriptor)?;
        }

        Ok(Self {
            specs,
            index,
            backend: Some(Box::new(backend)),
        })
    }

    /// Index the specs without registering them anywhere.
    pub fn collect(specs: Vec<ResponseSpec>) -> Result<Self, RegisterError> {
        let index = Self::build_index(&specs)?;
        Ok(Self {
            specs,
            index,
            backend: None,
        })
    }

    fn build_index(specs: &[ResponseSpec]) -> Result<HashMap<String, usize>, RegisterError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if index.insert(spec.name().to_string(), position).is_some() {
                return Err(RegisterError::DuplicateName {
                    name: spec.name().to_string(),
                });
            }
        }
        Ok(index)
    }

    /// Look up a spec by endpoint name.
    pub fn get(&self, name: &str) -> Result<&ResponseSpec, LookupError> {
        match self.index.get(name) {
            Some(&position) => Ok(&self.specs[position]),
            None => {
                let mut known: Vec<String> = self.index.keys().cloned().collect();
                known.sort_unstable();
                Err(LookupError {
                    name: name.to_string(),
                    known,
                })
            }
        }
    }

    /// Look up a spec by declaration position.
    pub fn at(&self, position: usize) -> Option<&ResponseSpec> {
        self.specs.get(position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterate the specs in declaration order. Restartable: each call
    /// starts fresh from the beginning.
    pub fn iter(&self) -> std::slice::Iter<'_, ResponseSpec> {
        self.specs.iter()
    }

    /// The full ordered sequence of specs.
    pub fn specs(&self) -> &[ResponseSpec] {
        &self.specs
    }

    /// Endpoint names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(ResponseSpec::name).collect()
    }

    /// Diagnostic string listing every registered endpoint name.
    pub fn describe(&self) -> String {
        format!("<MockSet with endpoints: {}>", self.names().join(", "))
    }

    /// Dispatch a simulated request through the owned backend.
    pub fn dispatch(&self, method: HttpMethod, url: &str) -> Result<MockResponse, DispatchError> {
        match &self.backend {
            Some(backend) => backend.intercept(method, url),
            None => Err(DispatchError::NoBackend),
        }
    }

    /// The most recent request the backend saw for the named endpoint.
    pub fn matched_request(&self, endpoint: &str) -> Option<RecordedRequest> {
        self.backend
            .as_ref()
            .and_then(|backend| backend.request_for(endpoint))
    }
}

impl fmt::Display for MockSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for MockSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSet")
            .field("specs", &self.specs)
            .field("registered", &self.backend.is_some())
            .finish()
    }
}

/// Panicking sugar for [`MockSet::get`], for terse assertions in tests.
impl Index<&str> for MockSet {
    type Output = ResponseSpec;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Ok(spec) => spec,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<'a> IntoIterator for &'a MockSet {
    type Item = &'a ResponseSpec;
    type IntoIter = std::slice::Iter<'a, ResponseSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::url::UrlPattern;
    use crate::mocks::backend::{DeferredBackend, EagerBackend};
    use crate::types::registration::{Body, RegistrationDescriptor};
    use rstest::rstest;
    use serde_json::json;

    fn fork() -> ResponseSpec {
        ResponseSpec::new(
            "Fork",
            UrlPattern::exact("https://example.com/api/fork"),
            HttpMethod::Post,
        )
        .with_json(json!({"id": "fork101", "message": "Forked project"}))
    }

    fn commit() -> ResponseSpec {
        ResponseSpec::new(
            "Commit",
            UrlPattern::exact("https://example.com/api/commit"),
            HttpMethod::Get,
        )
        .with_json(json!({"id": "commit102", "message": "Initial commit"}))
    }

    #[rstest]
    fn test_lookup_by_name_returns_the_supplied_spec() {
        let set = MockSet::register(vec![fork(), commit()], EagerBackend::new())
            .expect("Should register");

        assert_eq!(set["Fork"], fork());
        assert_eq!(set.get("Commit").unwrap(), &commit());
    }

    #[rstest]
    fn test_iteration_keeps_declaration_order_and_restarts() {
        let set = MockSet::collect(vec![fork(), commit()]).expect("Should collect");

        let first: Vec<&str> = set.iter().map(ResponseSpec::name).collect();
        let second: Vec<&str> = (&set).into_iter().map(ResponseSpec::name).collect();
        assert_eq!(first, vec!["Fork", "Commit"]);
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_positional_lookup() {
        let set = MockSet::collect(vec![fork(), commit()]).expect("Should collect");

        assert_eq!(set.at(0).unwrap().name(), "Fork");
        assert_eq!(set.at(1).unwrap().name(), "Commit");
        assert!(set.at(2).is_none());
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.specs().len(), 2);
    }

    #[rstest]
    fn test_duplicate_name_fails_before_any_registration() {
        struct CountingBackend {
            registrations: std::rc::Rc<std::cell::Cell<usize>>,
        }

        impl InterceptBackend for CountingBackend {
            fn register(&mut self, _: &RegistrationDescriptor) -> Result<(), BackendError> {
                self.registrations.set(self.registrations.get() + 1);
                Ok(())
            }

            fn intercept(
                &self,
                method: HttpMethod,
                url: &str,
            ) -> Result<MockResponse, DispatchError> {
                Err(DispatchError::NoMatch {
                    method,
                    url: url.to_string(),
                })
            }

            fn request_for(&self, _: &str) -> Option<RecordedRequest> {
                None
            }
        }

        let registrations = std::rc::Rc::new(std::cell::Cell::new(0));
        let backend = CountingBackend {
            registrations: registrations.clone(),
        };

        let err = MockSet::register(vec![fork(), fork()], backend).unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateName { ref name } if name == "Fork"));
        assert_eq!(registrations.get(), 0, "nothing may reach the backend");
    }

    #[rstest]
    fn test_backend_rejection_propagates() {
        let mut backend = EagerBackend::new();
        backend
            .register(&RegistrationDescriptor {
                url: UrlPattern::exact("https://example.com/api/fork"),
                method: HttpMethod::Post,
                endpoints: vec!["Occupied".to_string()],
                responses: vec![crate::types::registration::ResponseOutcome::Reply {
                    status: 200,
                    body: Body::Empty,
                }],
            })
            .expect("Should register");

        let err = MockSet::register(vec![fork()], backend).unwrap_err();
        assert!(matches!(
            err,
            RegisterError::Backend(BackendError::AlreadyRegistered { .. })
        ));
    }

    #[rstest]
    fn test_unknown_name_error_enumerates_registered_names() {
        let set = MockSet::collect(vec![fork(), commit()]).expect("Should collect");

        let err = set.get("Push").unwrap_err();
        assert_eq!(err.known, vec!["Commit".to_string(), "Fork".to_string()]);
        let message = err.to_string();
        assert!(message.contains("'Push'"));
        assert!(message.contains("Commit"));
        assert!(message.contains("Fork"));
    }

    #[rstest]
    fn test_unknown_name_error_suggests_closest() {
        let set = MockSet::collect(vec![fork(), commit()]).expect("Should collect");

        let err = set.get("Forc").unwrap_err();
        assert_eq!(err.suggestion(), Some("Fork"));
        assert!(err.to_string().contains("Did you mean 'Fork'?"));

        // Nothing plausibly close
        let err = set.get("Deployment").unwrap_err();
        assert_eq!(err.suggestion(), None);
    }

    #[rstest]
    #[should_panic(expected = "Unknown endpoint name: 'Push'")]
    fn test_index_sugar_panics_with_diagnostic() {
        let set = MockSet::collect(vec![fork()]).expect("Should collect");
        let _ = &set["Push"];
    }

    #[rstest]
    fn test_describe_lists_names_in_order() {
        let set = MockSet::collect(vec![fork(), commit()]).expect("Should collect");
        assert_eq!(set.describe(), "<MockSet with endpoints: Fork, Commit>");
        assert_eq!(set.to_string(), set.describe());
    }

    #[rstest]
    fn test_dispatch_through_registered_backend() {
        let set = MockSet::register(vec![fork(), commit()], DeferredBackend::new())
            .expect("Should register");

        let response = set
            .dispatch(HttpMethod::Post, "https://example.com/api/fork")
            .expect("Should match");
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            Body::Json(json!({"id": "fork101", "message": "Forked project"}))
        );
        assert_eq!(
            set.matched_request("Fork").map(|r| r.url),
            Some("https://example.com/api/fork".to_string())
        );
        assert_eq!(set.matched_request("Commit"), None);
    }

    #[rstest]
    fn test_dispatch_without_backend_fails() {
        let set = MockSet::collect(vec![fork()]).expect("Should collect");
        let err = set
            .dispatch(HttpMethod::Post, "https://example.com/api/fork")
            .unwrap_err();
        assert_eq!(err, DispatchError::NoBackend);
        assert_eq!(set.matched_request("Fork"), None);
    }

    #[rstest]
    fn test_scenario_flow_with_templates_and_eager_backend() {
        use crate::types::spec::TransportError;
        use crate::types::template::{EndpointTemplate, SpecOverrides};

        let push = EndpointTemplate::new(
            "Push",
            UrlPattern::exact("https://example.com/api/push"),
            HttpMethod::Post,
        )
        .with_status(200)
        .with_json(json!({"id": "push102", "message": "Pushed commit102"}));

        let set = MockSet::register(
            vec![
                fork(),
                commit(),
                push.build(
                    SpecOverrides::new()
                        .status(400)
                        .json(json!({"error": "Push failed"})),
                )
                .expect("Should build"),
                push.build(
                    SpecOverrides::new()
                        .name("ForcePush")
                        .url(UrlPattern::exact("https://example.com/api/force-push")),
                )
                .expect("Should build"),
            ],
            EagerBackend::new(),
        )
        .expect("Should register");

        let response = set
            .dispatch(HttpMethod::Post, "https://example.com/api/fork")
            .expect("Should match");
        assert_eq!(response.body, Body::Json(set["Fork"].json().unwrap().clone()));

        let response = set
            .dispatch(HttpMethod::Post, "https://example.com/api/push")
            .expect("Should match");
        assert_eq!(response.status, 400);
        assert_eq!(response.body, Body::Json(json!({"error": "Push failed"})));

        assert!(set.contains("ForcePush"));
        let response = set
            .dispatch(HttpMethod::Post, "https://example.com/api/force-push")
            .expect("Should match");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Body::Json(set["ForcePush"].json().unwrap().clone()));

        // The template's own defaults survive both builds.
        assert_eq!(
            push.json,
            Some(json!({"id": "push102", "message": "Pushed commit102"}))
        );

        // A failing endpoint raises instead of responding.
        let failing = EndpointTemplate::new(
            "PushTimeout",
            UrlPattern::exact("https://example.com/api/slow-push"),
            HttpMethod::Post,
        )
        .with_failure(TransportError::Timeout);
        let set = MockSet::register(vec![failing.spec()], EagerBackend::new())
            .expect("Should register");
        let err = set
            .dispatch(HttpMethod::Post, "https://example.com/api/slow-push")
            .unwrap_err();
        assert_eq!(err, DispatchError::Failure(TransportError::Timeout));
    }

    #[rstest]
    #[case("", "", 0)]
    #[case("fork", "fork", 0)]
    #[case("fork", "forc", 1)]
    #[case("fork", "", 4)]
    #[case("commit", "comit", 1)]
    #[case("push", "pull", 2)]
    fn test_edit_distance(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(edit_distance(a, b), expected);
        assert_eq!(edit_distance(b, a), expected);
    }
}
