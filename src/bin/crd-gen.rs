//! Prints the SimpleWeb CRD manifest as YAML, for cluster registration.

use kube::CustomResourceExt;

use simpleweb_operator::crd::SimpleWeb;

fn main() {
    let crd = SimpleWeb::crd();
    let yaml = serde_yaml::to_string(&crd).expect("serialize CRD");
    println!("{yaml}");
}
