//! Template-existence probing with a per-format advisory cache.

use crate::app::App;
use crate::context::RequestContext;
use crate::format::Format;
use dashmap::DashMap;

/// Decides whether a view template exists for the current endpoint and
/// format. The cache is advisory: concurrent probes may race and lose an
/// update, which is harmless because re-computation is idempotent. In
/// development mode every probe re-runs so template edits are picked up.
#[derive(Default)]
pub struct TemplateProbe {
    cache: DashMap<Format, bool>,
}

impl TemplateProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, app: &App, ctx: &mut RequestContext) -> bool {
        if !ctx.is_handling() {
            // interceptors never probe templates
            return false;
        }
        if let Some(flag) = ctx.has_template() {
            return flag;
        }
        let format = ctx.accept();
        let cached = self.cache.get(&format).map(|entry| *entry);
        let has_template = match cached {
            Some(flag) if !app.config().dev_mode => flag,
            _ => {
                let probed = probe(format, app, ctx);
                self.cache.entry(format).or_insert(probed);
                probed
            }
        };
        ctx.set_has_template(has_template);
        has_template
    }
}

fn probe(format: Format, app: &App, ctx: &RequestContext) -> bool {
    if !format.supports_template() {
        return false;
    }
    app.view_manager().load(ctx).is_some()
}
