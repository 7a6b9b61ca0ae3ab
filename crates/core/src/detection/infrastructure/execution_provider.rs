use ort::execution_providers::ExecutionProviderDispatch;

/// Set to any value to skip hardware acceleration and run inference on CPU.
pub const CPU_ONLY_ENV: &str = "FACECHECK_CPU_ONLY";

/// Preferred ONNX execution providers for the current platform.
///
/// ONNX Runtime falls back to CPU when a listed provider cannot be registered.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    if std::env::var_os(CPU_ONLY_ENV).is_some() {
        log::debug!("{CPU_ONLY_ENV} set, using CPU execution provider");
        return vec![];
    }
    platform_providers()
}

fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
