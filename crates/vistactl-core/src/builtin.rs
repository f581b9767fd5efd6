//! Builtin Vista3D deploy bundle
//!
//! The manifests for the stack ship inside the binary so a bare `vistactl
//! deploy` works without any files on disk. An external bundle directory
//! (`--bundle`) replaces all of this wholesale.

/// Bundle.yaml of the builtin bundle
pub const BUNDLE_YAML: &str = r#"apiVersion: vistactl/v1
metadata:
  name: vista3d
  version: 0.3.0
  appVersion: "1.0.0"
  description: Vista3D medical-imaging stack (segmentation server, image server, frontend)
"#;

/// Default values of the builtin bundle
pub const VALUES_YAML: &str = r#"# Default values for the Vista3D stack

server:
  image:
    repository: nvcr.io/nim/nvidia/vista3d
    tag: "1.0.0"
    pullPolicy: IfNotPresent
  replicas: 1
  port: 8000
  gpu:
    limit: 1
  shmSize: 8Gi

imageServer:
  image:
    repository: ghcr.io/hpe-medimaging/vista3d-image-server
    tag: "0.9.2"
    pullPolicy: IfNotPresent
  replicas: 1
  port: 8888

frontend:
  image:
    repository: ghcr.io/hpe-medimaging/vista3d-frontend
    tag: "0.9.2"
    pullPolicy: IfNotPresent
  replicas: 1
  port: 8501

persistence:
  storageClass: local-path
  models:
    size: 30Gi
  output:
    size: 20Gi

ingress:
  enabled: false
  host: ""
  className: nginx
  tlsSecret: ""

wait:
  timeout: 5m
  interval: 5s
"#;

/// Stateful claims for model weights and segmentation output
pub const TPL_PVCS: &str = r#"apiVersion: v1
kind: PersistentVolumeClaim
metadata:
  name: {{ release.name }}-models
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  accessModes:
    - ReadWriteOnce
  storageClassName: {{ values.persistence.storageClass }}
  resources:
    requests:
      storage: {{ values.persistence.models.size }}
---
apiVersion: v1
kind: PersistentVolumeClaim
metadata:
  name: {{ release.name }}-output
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  accessModes:
    - ReadWriteOnce
  storageClassName: {{ values.persistence.storageClass }}
  resources:
    requests:
      storage: {{ values.persistence.output.size }}
"#;

/// Vista3D segmentation server (GPU NIM container)
pub const TPL_SERVER: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ release.name }}-server
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/name: vista3d-server
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: server
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  replicas: {{ values.server.replicas }}
  selector:
    matchLabels:
      app.kubernetes.io/instance: {{ release.name }}
      app.kubernetes.io/component: server
  template:
    metadata:
      labels:
        app.kubernetes.io/instance: {{ release.name }}
        app.kubernetes.io/component: server
      annotations:
        checksum/values: "{{ values.server | tojson | sha256 }}"
    spec:
      imagePullSecrets:
        - name: {{ release.name }}-registry
      containers:
        - name: server
          image: "{{ values.server.image.repository }}:{{ values.server.image.tag }}"
          imagePullPolicy: {{ values.server.image.pullPolicy }}
          ports:
            - name: http
              containerPort: {{ values.server.port }}
          envFrom:
            - secretRef:
                name: {{ release.name }}-ngc-key
          readinessProbe:
            httpGet:
              path: /v1/health/ready
              port: http
            initialDelaySeconds: 30
            periodSeconds: 10
          resources:
            limits:
              nvidia.com/gpu: {{ values.server.gpu.limit }}
          volumeMounts:
            - name: models
              mountPath: /opt/nim/.cache
            - name: output
              mountPath: /workspace/output
            - name: shm
              mountPath: /dev/shm
      volumes:
        - name: models
          persistentVolumeClaim:
            claimName: {{ release.name }}-models
        - name: output
          persistentVolumeClaim:
            claimName: {{ release.name }}-output
        - name: shm
          emptyDir:
            medium: Memory
            sizeLimit: {{ values.server.shmSize }}
---
apiVersion: v1
kind: Service
metadata:
  name: {{ release.name }}-server
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: server
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  selector:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: server
  ports:
    - name: http
      port: {{ values.server.port }}
      targetPort: http
"#;

/// NIfTI image server feeding scans to the segmentation server
pub const TPL_IMAGE_SERVER: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ release.name }}-image-server
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/name: vista3d-image-server
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: image-server
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  replicas: {{ values.imageServer.replicas }}
  selector:
    matchLabels:
      app.kubernetes.io/instance: {{ release.name }}
      app.kubernetes.io/component: image-server
  template:
    metadata:
      labels:
        app.kubernetes.io/instance: {{ release.name }}
        app.kubernetes.io/component: image-server
    spec:
      containers:
        - name: image-server
          image: "{{ values.imageServer.image.repository }}:{{ values.imageServer.image.tag }}"
          imagePullPolicy: {{ values.imageServer.image.pullPolicy }}
          ports:
            - name: http
              containerPort: {{ values.imageServer.port }}
          env:
            - name: IMAGE_SERVER_PORT
              value: "{{ values.imageServer.port }}"
          readinessProbe:
            httpGet:
              path: /health
              port: http
            periodSeconds: 10
          volumeMounts:
            - name: output
              mountPath: /workspace/output
      volumes:
        - name: output
          persistentVolumeClaim:
            claimName: {{ release.name }}-output
---
apiVersion: v1
kind: Service
metadata:
  name: {{ release.name }}-image-server
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: image-server
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  selector:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: image-server
  ports:
    - name: http
      port: {{ values.imageServer.port }}
      targetPort: http
"#;

/// Visualization frontend
pub const TPL_FRONTEND: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ release.name }}-frontend
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/name: vista3d-frontend
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: frontend
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  replicas: {{ values.frontend.replicas }}
  selector:
    matchLabels:
      app.kubernetes.io/instance: {{ release.name }}
      app.kubernetes.io/component: frontend
  template:
    metadata:
      labels:
        app.kubernetes.io/instance: {{ release.name }}
        app.kubernetes.io/component: frontend
    spec:
      containers:
        - name: frontend
          image: "{{ values.frontend.image.repository }}:{{ values.frontend.image.tag }}"
          imagePullPolicy: {{ values.frontend.image.pullPolicy }}
          ports:
            - name: http
              containerPort: {{ values.frontend.port }}
          env:
            - name: STREAMLIT_SERVER_PORT
              value: "{{ values.frontend.port }}"
            - name: VISTA3D_SERVER
              value: "http://{{ release.name }}-server:{{ values.server.port }}"
            - name: IMAGE_SERVER
              value: "http://{{ release.name }}-image-server:{{ values.imageServer.port }}"
          readinessProbe:
            httpGet:
              path: /_stcore/health
              port: http
            periodSeconds: 10
---
apiVersion: v1
kind: Service
metadata:
  name: {{ release.name }}-frontend
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: frontend
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  selector:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/component: frontend
  ports:
    - name: http
      port: {{ values.frontend.port }}
      targetPort: http
"#;

/// Ingress for the frontend; renders to nothing unless a host is set
pub const TPL_INGRESS: &str = r#"{% if values.ingress.enabled and values.ingress.host %}
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: {{ release.name }}
  namespace: {{ release.namespace }}
  labels:
    app.kubernetes.io/instance: {{ release.name }}
    app.kubernetes.io/managed-by: {{ release.service }}
spec:
  ingressClassName: {{ values.ingress.className }}
{% if values.ingress.tlsSecret %}
  tls:
    - hosts:
        - {{ values.ingress.host }}
      secretName: {{ values.ingress.tlsSecret }}
{% endif %}
  rules:
    - host: {{ values.ingress.host }}
      http:
        paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: {{ release.name }}-frontend
                port:
                  number: {{ values.frontend.port }}
{% endif %}
"#;

/// Builtin templates in apply order: claims before the workloads that mount
/// them, ingress last.
pub const TEMPLATES: &[(&str, &str)] = &[
    ("pvcs.yaml.j2", TPL_PVCS),
    ("server.yaml.j2", TPL_SERVER),
    ("image-server.yaml.j2", TPL_IMAGE_SERVER),
    ("frontend.yaml.j2", TPL_FRONTEND),
    ("ingress.yaml.j2", TPL_INGRESS),
];
