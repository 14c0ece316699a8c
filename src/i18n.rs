// ==========================================
// 教室容量分配系统 - 提示消息
// ==========================================
// 消息文本在 locales/*.yml，默认 zh-CN
// 占位符格式: %{name}
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

/// 当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// 未知语言不切换，返回 false
pub fn set_locale(locale: &str) -> bool {
    match SUPPORTED_LOCALES.iter().find(|l| l.eq_ignore_ascii_case(locale)) {
        Some(supported) => {
            rust_i18n::set_locale(supported);
            true
        }
        None => false,
    }
}

/// 无参数消息
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 带参数消息
///
/// ```no_run
/// use class_optima::i18n::t_with_args;
/// let msg = t_with_args("import.completed", &[("count", "9")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |msg, (name, value)| {
        msg.replace(&format!("%{{{}}}", name), value)
    })
}
