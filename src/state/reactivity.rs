// ============================================================================
// REACTIVITY - Sistema de notificaciones/subscribers para reactividad
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T)>;

/// Identificador devuelto por `subscribe`, sirve para darse de baja
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Lista de subscribers notificados con el nuevo valor tras cada mutación
pub struct Subscribers<T> {
    next_id: Cell<u64>,
    callbacks: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Suscribirse a cambios
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.callbacks.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.callbacks.borrow_mut().retain(|(sub_id, _)| *sub_id != id);
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Notificar a todos los subscribers. Se copia la lista antes de llamar
    /// para que un callback pueda suscribir o darse de baja sin conflicto de borrow.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}
