//! Order list rewriting
//!
//! Order items are normalized to `[reference, direction]` first. Derived
//! references then sort by their expression; dotted references to physical
//! columns sort by the quoted column path, as do references whose leading
//! segments are include aliases rather than associations.

use crate::error::{DerivedError, DerivedResult};
use crate::model::Model;
use crate::naming::quote_path;
use crate::query::{FindOptions, OrderItem};
use crate::reference::DottedReference;
use crate::registry::ModelRegistry;
use crate::resolver::ExpressionResolver;
use crate::settings::DerivedFieldsSettings;
use sea_query::Expr;

#[derive(Debug, Clone, Copy)]
pub struct OrderRewriter<'a> {
	resolver: ExpressionResolver<'a>,
}

impl<'a> OrderRewriter<'a> {
	pub fn new(models: &'a ModelRegistry, settings: &'a DerivedFieldsSettings) -> Self {
		Self {
			resolver: ExpressionResolver::new(models, settings),
		}
	}

	/// Rewrite the order list of a descriptor
	///
	/// All items are rewritten before the list is replaced. Returns the
	/// number of items turned into sort expressions.
	pub fn rewrite(&self, model: &Model, options: &mut FindOptions) -> DerivedResult<usize> {
		let Some(order) = options.order.as_ref() else {
			return Ok(0);
		};

		let rewritten = order
			.iter()
			.map(|item| self.rewrite_item(model, item.clone()))
			.collect::<DerivedResult<Vec<_>>>()?;
		let count = rewritten
			.iter()
			.zip(order)
			.filter(|(after, before)| after.is_expr() && !before.is_expr())
			.count();

		options.order = Some(rewritten);
		Ok(count)
	}

	/// Rewrite a single order item against the root model
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::model::ModelDefinition;
	/// use reinhardt_derived_fields::query::OrderItem;
	/// use reinhardt_derived_fields::registry::ModelRegistry;
	/// use reinhardt_derived_fields::rewrite::OrderRewriter;
	/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
	/// use reinhardt_derived_fields::sql::render_expr;
	///
	/// let registry = ModelRegistry::new();
	/// let master = registry.define(ModelDefinition::new("Master")).unwrap();
	/// let settings = DerivedFieldsSettings::default();
	/// let rewriter = OrderRewriter::new(&registry, &settings);
	///
	/// match rewriter.rewrite_item(&master, OrderItem::desc("$Master.name$")).unwrap() {
	///     OrderItem::Expr { expr, direction } => {
	///         assert_eq!(render_expr(&expr), "\"name\"");
	///         assert_eq!(direction, "DESC");
	///     }
	///     other => panic!("unexpected item: {other:?}"),
	/// }
	/// ```
	pub fn rewrite_item(&self, model: &Model, item: OrderItem) -> DerivedResult<OrderItem> {
		let settings = self.resolver.settings();
		let mut parts = match item {
			OrderItem::Name(reference) => vec![reference, settings.default_direction.clone()],
			OrderItem::Seq(parts) => parts,
			expr @ OrderItem::Expr { .. } => return Ok(expr),
		};
		if parts.len() == 1 {
			parts.push(settings.default_direction.clone());
		}
		if parts.len() != 2 {
			tracing::trace!(len = parts.len(), "Order item left untouched");
			return Ok(OrderItem::Seq(parts));
		}
		let direction = parts.pop().unwrap_or_default();
		let reference = parts.pop().unwrap_or_default();

		if settings.order_by_derived_expression {
			match self.resolver.resolve(model, &reference, model.name()) {
				Ok(Some(resolved)) => {
					tracing::debug!(reference = %reference, direction = %direction, "Ordering by derived expression");
					return Ok(OrderItem::Expr {
						expr: resolved.expression,
						direction,
					});
				}
				Ok(None) => {}
				// Include aliases need not name associations
				Err(DerivedError::InvalidAssociation { .. } | DerivedError::UnknownModel(_)) => {
					tracing::trace!(reference = %reference, "Order reference is not an association path");
				}
				Err(err) => return Err(err),
			}
		}

		let Some(dotted) = DottedReference::parse(&reference) else {
			return Ok(OrderItem::Seq(vec![reference, direction]));
		};

		let mut segments = dotted.segments();
		if settings.strip_self_segment && segments.len() == 2 && segments[0] == model.name() {
			segments.remove(0);
		}
		tracing::debug!(reference = %reference, direction = %direction, "Ordering by column path");
		Ok(OrderItem::Expr {
			expr: Expr::cust(quote_path(segments)).into(),
			direction,
		})
	}
}
