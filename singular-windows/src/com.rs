use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

/// COM apartment membership for the current thread.
///
/// Joins the multithreaded apartment on creation and leaves it on drop.
/// A thread already initialized in another apartment mode keeps it, and
/// the scope then leaves it alone.
pub(crate) struct ComScope {
    owned: bool,
}

impl ComScope {
    pub(crate) fn enter() -> Self {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr.is_err() {
            log::debug!("COM already initialized on this thread: {:?}", hr);
        }
        Self { owned: hr.is_ok() }
    }
}

impl Drop for ComScope {
    fn drop(&mut self) {
        if self.owned {
            unsafe { CoUninitialize() };
        }
    }
}
