//! Tests for evaluating templates: macros, plugins, scoping and ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chirp::{
    Engine, ErrorCode, MacroDictionary, MacroMap, Plugin, PluginInput, PluginMap, PluginOutput,
    StringEntry, StringTable, TemplateError, from_fn, macro_fn, macros, parse, parse_by_id,
};

fn user_macros() -> MacroMap {
    macros! { "USER" => { "NAME" => "Alice", "POINTS" => 1200 } }
}

fn text_plugin(text: &'static str) -> Arc<dyn Plugin> {
    from_fn(move |_| Ok(PluginOutput::from(text)))
}

fn echo_plugin() -> Arc<dyn Plugin> {
    from_fn(|input| Ok(PluginOutput::from(input.args.unwrap_or_default())))
}

fn song_plugin() -> Arc<dyn Plugin> {
    macro_fn(|_| {
        let song = MacroDictionary::new()
            .with("TITLE", "Blue Zenith")
            .with("ARTIST", "Xi");
        Ok(MacroMap::new().with_group("SONG", song))
    })
}

fn plugins(entries: Vec<(&str, Arc<dyn Plugin>)>) -> PluginMap {
    PluginMap::from_plugins(entries).unwrap()
}

async fn render(template: &str, plugins: &PluginMap, macros: &MacroMap) -> Result<String, TemplateError> {
    parse(template, &StringTable::default(), plugins, macros).await
}

/// Plugin that records when it starts and finishes, sleeping in between.
struct Recorder {
    label: &'static str,
    delay: Duration,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Plugin for Recorder {
    async fn call(&self, _input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
        self.log.lock().unwrap().push(format!("start {}", self.label));
        tokio::time::sleep(self.delay).await;
        self.log.lock().unwrap().push(format!("end {}", self.label));
        Ok(PluginOutput::from(self.label))
    }
}

/// Plugin that counts its invocations and returns the running count.
struct Counter(AtomicUsize);

#[async_trait]
impl Plugin for Counter {
    async fn call(&self, _input: PluginInput<'_>) -> anyhow::Result<PluginOutput> {
        let count = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PluginOutput::Text(count.to_string()))
    }
}

// =============================================================================
// Plain text and macros
// =============================================================================

#[tokio::test]
async fn plain_text_is_returned_unchanged() {
    let plugins = PluginMap::new();
    for template in [
        "",
        "Hello, world!",
        "costs $5 (or more) | maybe",
        r"back\slash \( \)",
        "multi\nline",
    ] {
        assert_eq!(
            render(template, &plugins, &MacroMap::new()).await.unwrap(),
            template
        );
    }
}

#[tokio::test]
async fn macro_is_substituted() {
    let result = render("Hi %USER:NAME%, you have %USER:POINTS% points", &PluginMap::new(), &user_macros())
        .await
        .unwrap();
    assert_eq!(result, "Hi Alice, you have 1200 points");
}

#[tokio::test]
async fn missing_macro_group_fails() {
    let err = render("%STREAM:GAME%", &PluginMap::new(), &user_macros())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MacroNotFound);
    assert!(!err.is_build_error());
}

#[tokio::test]
async fn missing_macro_key_fails_with_suggestion() {
    let err = render("%USER:NAM%", &PluginMap::new(), &user_macros())
        .await
        .unwrap_err();
    let TemplateError::MacroNotFound {
        group,
        key,
        suggestions,
    } = err
    else {
        panic!("expected MacroNotFound");
    };
    assert_eq!((group.as_str(), key.as_str()), ("USER", "NAM"));
    assert_eq!(suggestions, vec!["NAME"]);
}

// =============================================================================
// References
// =============================================================================

#[tokio::test]
async fn parse_by_id_inlines_references() {
    let strings = StringTable::new([StringEntry::new("A", "x$[B]y"), StringEntry::new("B", "mid")])
        .unwrap();
    let result = parse_by_id("A", &strings, &PluginMap::new(), &MacroMap::new())
        .await
        .unwrap();
    assert_eq!(result, "xmidy");
}

#[tokio::test]
async fn parse_by_id_unknown_id_fails() {
    let err = parse_by_id("NOPE", &StringTable::default(), &PluginMap::new(), &MacroMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::StringNotFound);
}

// =============================================================================
// Plugins
// =============================================================================

#[tokio::test]
async fn plugin_without_args_returns_text() {
    let plugins = plugins(vec![("USER", text_plugin("Alice"))]);
    let result = render("$(USER)", &plugins, &MacroMap::new()).await.unwrap();
    assert_eq!(result, "Alice");
}

#[tokio::test]
async fn plugin_args_are_evaluated_first() {
    let plugins = plugins(vec![("ECHO", echo_plugin()), ("USER", text_plugin("Bob"))]);
    let result = render("$(ECHO=%USER:NAME% and $(USER))", &plugins, &user_macros())
        .await
        .unwrap();
    assert_eq!(result, "Alice and Bob");
}

#[tokio::test]
async fn escaped_parentheses_reach_plugin_as_literal_text() {
    let plugins = plugins(vec![("P", echo_plugin())]);
    let result = render(r"$(P=a\(b\)c)", &plugins, &MacroMap::new()).await.unwrap();
    assert_eq!(result, "a(b)c");
}

#[tokio::test]
async fn plugin_sees_whether_token_has_scope() {
    let has_scope = from_fn(|input| Ok(PluginOutput::from(input.has_scope.to_string())));
    let plugins = plugins(vec![("HAS_SCOPE", has_scope)]);
    let result = render("$(HAS_SCOPE) $(HAS_SCOPE=x|y)", &plugins, &MacroMap::new())
        .await
        .unwrap();
    assert_eq!(result, "false true");
}

#[tokio::test]
async fn text_plugin_ignores_scope() {
    let plugins = plugins(vec![("USER", text_plugin("Alice"))]);
    let result = render("$(USER|never shown)", &plugins, &MacroMap::new())
        .await
        .unwrap();
    assert_eq!(result, "Alice");
}

#[tokio::test]
async fn unknown_plugin_fails() {
    let plugins = plugins(vec![("USER", text_plugin("Alice"))]);
    let err = render("$(NOPE)", &plugins, &MacroMap::new()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PluginNotFound);

    let err = render("$(USR)", &plugins, &MacroMap::new()).await.unwrap_err();
    let TemplateError::PluginNotFound { name, suggestions } = err else {
        panic!("expected PluginNotFound");
    };
    assert_eq!(name, "USR");
    assert_eq!(suggestions, vec!["USER"]);
}

#[tokio::test]
async fn plugin_failure_is_plugin_error() {
    let failing = from_fn(|_| Err(anyhow::anyhow!("api down")));
    let plugins = plugins(vec![("FOLLOWAGE", failing)]);
    let err = render("$(FOLLOWAGE)", &plugins, &MacroMap::new()).await.unwrap_err();
    let TemplateError::PluginError { name, message } = err else {
        panic!("expected PluginError");
    };
    assert_eq!(name, "FOLLOWAGE");
    assert_eq!(message, "api down");
}

#[tokio::test]
async fn macro_plugin_failure_is_macro_error() {
    let failing = macro_fn(|_| Err(anyhow::anyhow!("no song playing")));
    let plugins = plugins(vec![("SONG", failing)]);
    let err = render("$(SONG|%SONG:TITLE%)", &plugins, &MacroMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MacroError);
    let TemplateError::MacroError { plugin, message } = err else {
        panic!("expected MacroError");
    };
    assert_eq!(plugin, "SONG");
    assert_eq!(message, "no song playing");
}

// =============================================================================
// Macro scoping
// =============================================================================

#[tokio::test]
async fn macro_plugin_scope_sees_generated_macros() {
    let plugins = plugins(vec![("SONG", song_plugin())]);
    let result = render(
        "Now playing: $(SONG|%SONG:TITLE% by %SONG:ARTIST%)",
        &plugins,
        &MacroMap::new(),
    )
    .await
    .unwrap();
    assert_eq!(result, "Now playing: Blue Zenith by Xi");
}

#[tokio::test]
async fn scope_still_sees_outer_macros() {
    let plugins = plugins(vec![("SONG", song_plugin())]);
    let result = render("$(SONG|%USER:NAME% likes %SONG:TITLE%)", &plugins, &user_macros())
        .await
        .unwrap();
    assert_eq!(result, "Alice likes Blue Zenith");
}

#[tokio::test]
async fn generated_macros_do_not_leak_out_of_scope() {
    let plugins = plugins(vec![("SONG", song_plugin())]);
    let err = render("$(SONG|%SONG:TITLE%) %SONG:TITLE%", &plugins, &MacroMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MacroNotFound);
}

#[tokio::test]
async fn generated_group_shadows_outer_group() {
    let target = macro_fn(|_| {
        Ok(MacroMap::new().with_group("USER", MacroDictionary::new().with("NAME", "Bob")))
    });
    let plugins = plugins(vec![("TARGET", target)]);
    let result = render(
        "%USER:NAME% hugs $(TARGET|%USER:NAME%), says %USER:NAME%",
        &plugins,
        &user_macros(),
    )
    .await
    .unwrap();
    assert_eq!(result, "Alice hugs Bob, says Alice");
}

#[tokio::test]
async fn shadowing_group_hides_outer_keys() {
    let target = macro_fn(|_| {
        Ok(MacroMap::new().with_group("USER", MacroDictionary::new().with("NAME", "Bob")))
    });
    let plugins = plugins(vec![("TARGET", target)]);
    let err = render("$(TARGET|%USER:POINTS%)", &plugins, &user_macros())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MacroNotFound);
}

#[tokio::test]
async fn nested_macro_plugins_stack_scopes() {
    let outer = macro_fn(|_| {
        Ok(MacroMap::new().with_group("A", MacroDictionary::new().with("V", "outer")))
    });
    let inner = macro_fn(|_| {
        Ok(MacroMap::new().with_group("B", MacroDictionary::new().with("V", "inner")))
    });
    let plugins = plugins(vec![("OUTER", outer), ("INNER", inner)]);
    let result = render("$(OUTER|$(INNER|%A:V%/%B:V%))", &plugins, &MacroMap::new())
        .await
        .unwrap();
    assert_eq!(result, "outer/inner");
}

#[tokio::test]
async fn macro_plugin_without_scope_is_empty() {
    let plugins = plugins(vec![("SONG", song_plugin())]);
    let result = render("[$(SONG)]", &plugins, &MacroMap::new()).await.unwrap();
    assert_eq!(result, "[]");
}

// =============================================================================
// Ordering and invocation count
// =============================================================================

#[tokio::test]
async fn plugins_run_in_document_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let slow = Recorder {
        label: "A",
        delay: Duration::from_millis(30),
        log: Arc::clone(&log),
    };
    let fast = Recorder {
        label: "B",
        delay: Duration::ZERO,
        log: Arc::clone(&log),
    };
    let plugins = plugins(vec![
        ("A", Arc::new(slow) as Arc<dyn Plugin>),
        ("B", Arc::new(fast) as Arc<dyn Plugin>),
    ]);

    let result = render("$(A)$(B)", &plugins, &MacroMap::new()).await.unwrap();

    assert_eq!(result, "AB");
    assert_eq!(*log.lock().unwrap(), vec!["start A", "end A", "start B", "end B"]);
}

#[tokio::test]
async fn each_plugin_node_is_invoked_once() {
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let plugins = plugins(vec![("COUNT", counter.clone() as Arc<dyn Plugin>)]);
    let result = render("$(COUNT) $(COUNT) $(COUNT)", &plugins, &MacroMap::new())
        .await
        .unwrap();
    assert_eq!(result, "1 2 3");
    assert_eq!(counter.0.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn build_errors_are_raised_before_any_plugin_runs() {
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let plugins = plugins(vec![("COUNT", counter.clone() as Arc<dyn Plugin>)]);

    let err = render("$(COUNT) $[MISSING]", &plugins, &MacroMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::StringNotFound);

    let err = render("$(COUNT) $()", &plugins, &MacroMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoPluginName);

    assert_eq!(counter.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_error_aborts_evaluation() {
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let plugins = plugins(vec![("COUNT", counter.clone() as Arc<dyn Plugin>)]);
    let err = render("$(COUNT)%X:Y%$(COUNT)", &plugins, &MacroMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MacroNotFound);
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Engine
// =============================================================================

#[tokio::test]
async fn engine_renders_strings_by_id() {
    let strings = StringTable::new([StringEntry::new("HELLO", "Hello $(USER)!")]).unwrap();
    let engine = Engine::builder()
        .strings(strings)
        .plugins(plugins(vec![("USER", text_plugin("Alice"))]))
        .build();

    assert_eq!(
        engine.render_by_id("HELLO", &MacroMap::new()).await.unwrap(),
        "Hello Alice!"
    );
    assert_eq!(
        engine.render("$[HELLO] :)", &MacroMap::new()).await.unwrap(),
        "Hello Alice! :)"
    );
}

#[tokio::test]
async fn engine_with_custom_strings_keeps_plugins() {
    let strings = StringTable::new([StringEntry::new("HELLO", "Hello $(USER)!")]).unwrap();
    let engine = Engine::builder()
        .strings(strings.clone())
        .plugins(plugins(vec![("USER", text_plugin("Alice"))]))
        .build();
    let custom = engine.with_strings(strings.with_overrides([("HELLO", "Hey $(USER)")]).unwrap());

    assert_eq!(
        custom.render_by_id("HELLO", &MacroMap::new()).await.unwrap(),
        "Hey Alice"
    );
    assert_eq!(
        engine.render_by_id("HELLO", &MacroMap::new()).await.unwrap(),
        "Hello Alice!"
    );
    assert!(custom.plugins().contains("USER"));
}

#[tokio::test]
async fn default_engine_renders_plain_text() {
    let engine = Engine::default();
    assert!(engine.strings().is_empty());
    assert_eq!(
        engine.render("just text", &MacroMap::new()).await.unwrap(),
        "just text"
    );
    assert!(engine.build("$(USER)").unwrap().plugin_names().contains("USER"));
}

#[tokio::test]
async fn concurrent_renders_keep_their_own_macros() {
    let strings = StringTable::new([StringEntry::new(
        "POINTS",
        "$(SLOW) %USER:NAME% has %USER:POINTS% points",
    )])
    .unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let slow = Arc::new(Recorder {
        label: "slow",
        delay: Duration::from_millis(10),
        log: Arc::clone(&log),
    }) as Arc<dyn Plugin>;
    let engine = Engine::builder()
        .strings(strings)
        .plugins(plugins(vec![("SLOW", slow)]))
        .build();
    let alice = macros! { "USER" => { "NAME" => "Alice", "POINTS" => 10 } };
    let bob = macros! { "USER" => { "NAME" => "Bob", "POINTS" => 20 } };

    let (first, second) = futures::future::join(
        engine.render_by_id("POINTS", &alice),
        engine.render_by_id("POINTS", &bob),
    )
    .await;

    assert_eq!(first.unwrap(), "slow Alice has 10 points");
    assert_eq!(second.unwrap(), "slow Bob has 20 points");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start slow", "start slow", "end slow", "end slow"]
    );
}

#[tokio::test]
async fn engine_clone_renders_on_spawned_task() {
    let strings = StringTable::new([StringEntry::new("A", "x$(ECHO=%USER:NAME%)y")]).unwrap();
    let engine = Engine::builder()
        .strings(strings)
        .plugins(plugins(vec![("ECHO", echo_plugin())]))
        .build();

    let spawned = engine.clone();
    let handle = tokio::spawn(async move {
        let macros = macros! { "USER" => { "NAME" => "u" } };
        spawned.render_by_id("A", &macros).await
    });

    let local = engine.render_by_id("A", &user_macros()).await.unwrap();
    assert_eq!(handle.await.unwrap().unwrap(), "xuy");
    assert_eq!(local, "xAlicey");
}
