// Fakes compartidos por los tests del crate

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::models::Company;
use crate::services::navigation::Navigator;
use crate::services::transport::{ApiRequest, ApiResponse, HttpTransport, Method};

enum Scripted {
    Respond(ApiResponse),
    /// Cede el control una vez antes de responder
    Suspend(ApiResponse),
    /// Espera a que el test abra la compuerta
    Gated(ApiResponse, Gate),
    Fail(String),
}

/// Transporte con respuestas programadas por método + ruta, en orden FIFO.
/// Una ruta sin respuestas pendientes devuelve 404.
#[derive(Default)]
pub struct MockTransport {
    scripts: RefCell<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.scripts
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Respond(ApiResponse::new(status, body.to_string())));
    }

    pub fn respond_suspended(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Suspend(ApiResponse::new(status, body.to_string())));
    }

    pub fn respond_gated(&self, method: Method, path: &str, status: u16, body: Value) -> Gate {
        let gate = Gate::default();
        self.push(
            method,
            path,
            Scripted::Gated(ApiResponse::new(status, body.to_string()), gate.clone()),
        );
        gate
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Scripted::Fail(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        let next = self
            .scripts
            .borrow_mut()
            .get_mut(&(request.method, request.path.clone()))
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Suspend(response)) => {
                YieldOnce::default().await;
                Ok(response)
            }
            Some(Scripted::Gated(response, gate)) => {
                gate.wait().await;
                Ok(response)
            }
            Some(Scripted::Fail(message)) => Err(TransportError(message)),
            None => Ok(ApiResponse::new(404, "")),
        }
    }
}

#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Compuerta que mantiene pendiente una respuesta hasta `open()`
#[derive(Default, Clone)]
pub struct Gate(Rc<GateState>);

#[derive(Default)]
struct GateState {
    open: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl Gate {
    pub fn open(&self) {
        self.0.open.set(true);
        if let Some(waker) = self.0.waker.borrow_mut().take() {
            waker.wake();
        }
    }

    async fn wait(&self) {
        std::future::poll_fn(|cx| {
            if self.0.open.get() {
                Poll::Ready(())
            } else {
                *self.0.waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        })
        .await
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.borrow_mut().push(path.to_string());
    }
}

/// Contador simple para callbacks de subscribers
#[derive(Default, Clone)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn hit(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

pub fn company(id: i64) -> Company {
    Company {
        id,
        razon_social: format!("Empresa {} S.L.", id),
        nombre_comercial: None,
        logo: None,
    }
}

pub fn company_json(id: i64) -> Value {
    json!({ "id": id, "razon_social": format!("Empresa {} S.L.", id) })
}

/// Cuerpo de `/usuarios/login/` con el rol y las empresas dados
pub fn login_body(rol: &str, companies: &[i64]) -> Value {
    json!({
        "access": "access-1",
        "refresh": "refresh-1",
        "usuario": {
            "id": 42,
            "email": "marta@acme.es",
            "nombre": "Marta",
            "apellidos": "Ruiz",
            "rol": rol,
            "empresas": companies.iter().map(|id| company_json(*id)).collect::<Vec<_>>(),
        }
    })
}
